use std::{error::Error, fs::File, io::BufReader, path::PathBuf};

use clap::Args;

use fitsrs::{AsciiTableHdu, BinaryTableHdu, FitsFile, Hdu, ImageHdu};

#[derive(Debug, Clone, Args)]
pub struct Struct {
    /// Path of the input file.
    #[clap(value_name = "FILE")]
    pub input: PathBuf,
}

impl Struct {
    pub fn exec(self) -> Result<(), Box<dyn Error>> {
        let file = File::open(&self.input)?;
        let reader = BufReader::new(file);
        let mut fits = FitsFile::from_seekable_reader(reader);

        let mut i = 0;
        while let Some(hdu) = fits.advance()? {
            print_hdu_struct(i, hdu)?;
            i += 1;
        }
        Ok(())
    }
}

fn print_hdu_struct(i: usize, hdu: &Hdu) -> Result<(), Box<dyn Error>> {
    println!("HDU[{i}]:");
    match hdu {
        Hdu::Primary(img) => print_imghdu_struct("PRIMARY", img),
        Hdu::XImage(img) => print_imghdu_struct("IMAGE", img),
        Hdu::XBinaryTable(bintable) => print_bintablehdu_struct(bintable),
        Hdu::XAsciiTable(asciitable) => print_asciitablehdu_struct(asciitable),
    }
    print_data_struct(hdu);
    Ok(())
}

fn print_imghdu_struct(kind: &str, img: &ImageHdu) {
    print_hdu_type(kind);
    println!(
        " * HEAD naxis: {}; bitpix: {:?}; dimensions: {}.",
        img.naxis(),
        img.bitpix,
        img.naxisn
            .iter()
            .map(|d| d.to_string())
            .reduce(|mut s, d| {
                s.push('x');
                s.push_str(&d);
                s
            })
            .unwrap_or_else(|| String::from("0"))
    );
}

fn print_bintablehdu_struct(bintable: &BinaryTableHdu) {
    print_hdu_type("BINTABLE");
    println!(
        " * HEAD n_cols: {}; n_rows: {}.",
        bintable.columns.len(),
        bintable.row_count()
    );
}

fn print_asciitablehdu_struct(asciitable: &AsciiTableHdu) {
    print_hdu_type("ASCIITABLE");
    println!(
        " * HEAD n_cols: {}; n_rows: {}.",
        asciitable.columns.len(),
        asciitable.row_count()
    );
}

fn print_hdu_type(hdu_type: &str) {
    println!(" * HDU type: {hdu_type}");
}

fn print_data_struct(hdu: &Hdu) {
    println!(
        " * DATA stride length: {}; total strides: {}.",
        hdu.stride_length(),
        hdu.total_strides()
    );
}
