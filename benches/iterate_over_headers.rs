use criterion::{criterion_group, criterion_main, Criterion};

use fitsrs::FitsFile;
use std::io::Cursor;

const CARD_SIZE: usize = 80;

fn card(text: &str) -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    let bytes = text.as_bytes();
    buf[..bytes.len()].copy_from_slice(bytes);
    buf
}

/// Builds an in-memory multi-HDU FITS file: one primary image followed by
/// `extensions` image extensions, each with a small header and no data.
/// The teacher's benchmark iterates real sample files under `samples/`,
/// which are not part of this workspace; this constructs an equivalent
/// header-only fixture instead.
fn build_headers_only_fits(extensions: usize) -> Vec<u8> {
    let mut out = Vec::new();

    for card_text in [
        "SIMPLE  =                    T",
        "BITPIX  =                    8",
        "NAXIS   =                    0",
        "END",
    ] {
        out.extend_from_slice(&card(card_text));
    }
    while out.len() % 2880 != 0 {
        out.push(b' ');
    }

    for _ in 0..extensions {
        for card_text in [
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "END",
        ] {
            out.extend_from_slice(&card(card_text));
        }
        while out.len() % 2880 != 0 {
            out.push(b' ');
        }
    }

    out
}

fn iterate_all_headers(bytes: &[u8]) {
    let mut fits = FitsFile::from_seekable_reader(Cursor::new(bytes.to_vec()));
    let mut corrupted = false;
    loop {
        match fits.advance() {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => {
                corrupted = true;
                break;
            }
        }
    }
    assert!(!corrupted);
}

fn criterion_benchmark_parse_only_headers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse only headers");
    group.measurement_time(std::time::Duration::from_millis(100));

    for extensions in [1usize, 10, 100] {
        let bytes = build_headers_only_fits(extensions);
        group.bench_function(format!("{extensions} extensions"), |b| {
            b.iter(|| iterate_all_headers(&bytes))
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark_parse_only_headers);
criterion_main!(benches);
