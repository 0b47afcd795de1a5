use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use wastesort::classifier::{decode_image, preprocess};
use wastesort::{ClassificationResult, ClassifierError, ImageModel, InputLayout};

struct ConstantModel;

impl ImageModel for ConstantModel {
    fn input_size(&self) -> u32 {
        224
    }

    fn input_layout(&self) -> InputLayout {
        InputLayout::Nhwc
    }

    fn forward(&self, _batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        Ok(vec![0.05, 0.1, 0.6, 0.1, 0.1, 0.05])
    }
}

fn photo(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(image)
}

fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

fn bench_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decoding");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let source = photo(1024, 768);
    let png = encoded(&source, ImageFormat::Png);
    let jpeg = encoded(&source, ImageFormat::Jpeg);

    group.bench_function("png_1024x768", |b| b.iter(|| decode_image(black_box(&png)).unwrap()));
    group.bench_function("jpeg_1024x768", |b| b.iter(|| decode_image(black_box(&jpeg)).unwrap()));

    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Preprocessing");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Source resolution matters more than the target size for the resize
    for (width, height) in [(224, 224), (640, 480), (1920, 1080), (4032, 3024)] {
        let image = photo(width, height);
        group.bench_function(format!("nhwc_{}x{}", width, height), |b| {
            b.iter(|| preprocess(black_box(&image), 224, InputLayout::Nhwc))
        });
    }

    let image = photo(640, 480);
    group.bench_function("nchw_640x480", |b| b.iter(|| preprocess(black_box(&image), 224, InputLayout::Nchw)));

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);

    let probabilities = [0.05, 0.1, 0.6, 0.1, 0.1, 0.05];
    group.bench_function("from_probabilities", |b| {
        b.iter(|| ClassificationResult::from_probabilities(black_box(&probabilities)).unwrap())
    });

    let upload = encoded(&photo(800, 600), ImageFormat::Jpeg);
    group.bench_function("classify_bytes_end_to_end", |b| {
        b.iter(|| ConstantModel.classify_bytes(black_box(&upload)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_decoding, bench_preprocessing, bench_prediction);
criterion_main!(benches);
