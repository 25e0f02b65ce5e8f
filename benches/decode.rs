use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::GrayImage;
use rust_barcode::tools::render::{
    LinearRenderOptions, QrRenderOptions, code128_widths, ean13_widths, render_linear, render_qr,
};
use rust_barcode::{ImageBuffer, ScanOptions, decode, decode_batch};

fn bench_image(c: &mut Criterion, name: &str, image: &GrayImage) {
    let buffer = ImageBuffer::from_gray(image).unwrap();
    let options = ScanOptions::default();
    c.bench_function(name, |b| {
        b.iter(|| decode(black_box(&buffer), black_box(&options)))
    });
}

fn bench_decode_empty(c: &mut Criterion) {
    let image = GrayImage::from_pixel(640, 480, image::Luma([128]));
    bench_image(c, "decode_empty_640x480", &image);
}

fn bench_decode_qr_small(c: &mut Criterion) {
    let image = render_qr(b"HELLO", &QrRenderOptions::default()).unwrap();
    bench_image(c, "decode_qr_v1", &image);
}

fn bench_decode_qr_large(c: &mut Criterion) {
    let options = QrRenderOptions {
        min_version: 10,
        ..QrRenderOptions::default()
    };
    let image = render_qr(&[b'x'; 200], &options).unwrap();
    bench_image(c, "decode_qr_v10", &image);
}

fn bench_decode_linear(c: &mut Criterion) {
    let options = LinearRenderOptions::default();
    let ean = render_linear(&ean13_widths("400638133393").unwrap(), &options);
    bench_image(c, "decode_ean13", &ean);
    let code128 = render_linear(&code128_widths(b"BENCH-128").unwrap(), &options);
    bench_image(c, "decode_code128", &code128);
}

fn bench_decode_batch(c: &mut Criterion) {
    let images: Vec<GrayImage> = (0..8)
        .map(|i| render_qr(format!("batch item {i}").as_bytes(), &QrRenderOptions::default()).unwrap())
        .collect();
    let buffers: Vec<ImageBuffer<'_>> = images
        .iter()
        .map(|i| ImageBuffer::from_gray(i).unwrap())
        .collect();
    let options = ScanOptions::default();
    c.bench_function("decode_batch_8_qr", |b| {
        b.iter(|| decode_batch(black_box(&buffers), black_box(&options)))
    });
}

criterion_group!(
    benches,
    bench_decode_empty,
    bench_decode_qr_small,
    bench_decode_qr_large,
    bench_decode_linear,
    bench_decode_batch
);
criterion_main!(benches);
