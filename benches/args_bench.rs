use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gsdrive::{args, ConversionSettings, Device, PageRange, PaperSize};

fn bench_compile_raster(c: &mut Criterion) {
    let settings = ConversionSettings::new(Device::Png16m)
        .with_pages(PageRange::between(1, 20))
        .with_paper(PaperSize::A4)
        .with_resolution(300, 300)
        .with_rendering_threads(4)
        .with_max_bitmap(500_000_000);
    let inputs = ["input.pdf"];

    c.bench_function("compile_png16m_args", |b| {
        b.iter(|| args::compile(black_box(&settings), black_box("page-%d.png"), &inputs).unwrap())
    });
}

fn bench_compile_thumbnails(c: &mut Criterion) {
    c.bench_function("compile_thumbnail_args", |b| {
        b.iter(|| {
            args::compile_thumbnails(
                black_box("input.pdf"),
                black_box("thumb-%d.jpg"),
                1,
                10,
                72,
                72,
                0,
                0,
            )
            .unwrap()
        })
    });
}

fn bench_settings_from_json(c: &mut Criterion) {
    let json = r#"{"device":"jpeg","pages":{"range":{"start":2,"end":4}},"resolution":{"width":150,"height":150}}"#;
    c.bench_function("settings_from_json", |b| {
        b.iter(|| ConversionSettings::from_json(black_box(json)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_compile_raster,
    bench_compile_thumbnails,
    bench_settings_from_json
);
criterion_main!(benches);
