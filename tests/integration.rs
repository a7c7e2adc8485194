use std::fs;
use std::path::PathBuf;

use hidden_stamp::validation::{DEFAULT_STAMP_TEXT, MAX_FILE_COUNT};
use hidden_stamp::{encode_png, Error, StampEngine, StampOptions};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::tempdir;

fn engine_with(text: &str) -> StampEngine {
    StampEngine::new(&StampOptions {
        text: text.to_string(),
        ..StampOptions::default()
    })
    .unwrap()
}

#[allow(clippy::cast_possible_truncation)]
fn noisy_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
        Rgb([(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8])
    })
}

#[test]
fn engine_initializes_with_defaults() {
    let engine = StampEngine::new(&StampOptions::default()).unwrap();
    assert_eq!(engine.text(), DEFAULT_STAMP_TEXT);
}

#[test]
fn stamp_survives_png_file_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("photo.png");
    noisy_image(64, 48).save(&input).unwrap();

    let engine = engine_with("© 2026 Example Studio");
    let output = dir.path().join("out").join("photo_stamped.png");
    let result = engine.stamp_file(&input, &output);
    assert!(result.success, "{}", result.message);
    assert_eq!(result.output.as_deref(), Some(output.as_path()));

    let verified = engine.verify_file(&output);
    assert!(verified.success);
    assert!(verified.verification.found);
    assert_eq!(
        verified.verification.text.as_deref(),
        Some("© 2026 Example Studio")
    );

    // the original is left alone
    let original = engine.verify_file(&input);
    assert!(original.success);
    assert!(!original.verification.found);
}

#[test]
fn stamping_changes_each_channel_by_at_most_one() {
    let engine = engine_with("HiddenStamp");
    let original = noisy_image(40, 40);
    let stamped_png = engine.stamp_bytes(&encode_png(&original).unwrap()).unwrap();
    let stamped = image::load_from_memory(&stamped_png).unwrap().to_rgb8();

    assert_eq!(stamped.dimensions(), original.dimensions());
    for (a, b) in original.as_raw().iter().zip(stamped.as_raw()) {
        assert!(a.abs_diff(*b) <= 1);
    }
}

#[test]
fn alpha_channel_is_stripped_before_embedding() {
    let rgba = RgbaImage::from_pixel(30, 30, Rgba([200, 100, 50, 128]));
    let mut input = Vec::new();
    rgba.write_to(&mut std::io::Cursor::new(&mut input), ImageFormat::Png)
        .unwrap();

    let engine = engine_with("alpha");
    let stamped = engine.stamp_bytes(&input).unwrap();
    let decoded = image::load_from_memory(&stamped).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgb8);

    let found = engine.verify_bytes(&stamped).unwrap();
    assert_eq!(found.text.as_deref(), Some("alpha"));
}

#[test]
fn lossy_jpeg_input_can_be_stamped_as_png() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("photo.jpg");
    noisy_image(32, 32).save(&input).unwrap();

    let engine = engine_with("jpeg source");
    let results = engine
        .stamp_files(&[input], Some(dir.path()))
        .unwrap();
    assert!(results[0].success, "{}", results[0].message);

    let output = dir.path().join("photo_stamped.png");
    let verified = engine.verify_file(&output);
    assert_eq!(
        verified.verification.text.as_deref(),
        Some("jpeg source")
    );
}

#[test]
fn image_too_small_fails_without_writing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiny.png");
    noisy_image(3, 3).save(&input).unwrap();

    let engine = engine_with("HiddenStamp");
    let output = dir.path().join("tiny_stamped.png");
    let result = engine.stamp_file(&input, &output);
    assert!(!result.success);
    assert!(result.message.contains("image too small to embed watermark"));
    assert!(!output.exists());

    assert!(matches!(
        engine.stamp_bytes(&fs::read(&input).unwrap()),
        Err(Error::Capacity { .. })
    ));
}

#[test]
fn unsupported_and_oversized_files_are_rejected() {
    let dir = tempdir().unwrap();
    let gif = dir.path().join("anim.gif");
    fs::write(&gif, b"GIF89a").unwrap();

    let engine = engine_with("HiddenStamp");
    let result = engine.stamp_file(&gif, &dir.path().join("anim_stamped.png"));
    assert!(!result.success);
    assert!(result.message.contains("unsupported image format"));

    let big = dir.path().join("big.png");
    noisy_image(64, 64).save(&big).unwrap();
    let strict = StampEngine::new(&StampOptions {
        max_file_size: 16,
        ..StampOptions::default()
    })
    .unwrap();
    let verified = strict.verify_file(&big);
    assert!(!verified.success);
    assert!(verified.message.contains("file too large"));
}

#[test]
fn corrupt_image_is_a_failure_not_a_miss() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.png");
    fs::write(&bogus, b"definitely not a png").unwrap();

    let verified = engine_with("x").verify_file(&bogus);
    assert!(!verified.success);
    assert!(!verified.verification.found);
}

#[test]
fn batch_limits_are_enforced() {
    let engine = engine_with("HiddenStamp");
    assert!(matches!(engine.stamp_files(&[], None), Err(Error::NoFiles)));

    let too_many: Vec<PathBuf> = (0..=MAX_FILE_COUNT)
        .map(|i| PathBuf::from(format!("img{i}.png")))
        .collect();
    assert!(matches!(
        engine.verify_files(&too_many),
        Err(Error::TooManyFiles { .. })
    ));
}

#[test]
fn directory_batch_stamps_every_supported_image() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    for name in ["a.png", "b.png", "c.jpg"] {
        noisy_image(24, 24).save(input_dir.join(name)).unwrap();
    }
    fs::write(input_dir.join("notes.txt"), "skip me").unwrap();

    let engine = engine_with("batch");
    let results = engine.stamp_directory(&input_dir, &output_dir);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));

    let stamped: Vec<PathBuf> = ["a", "b", "c"]
        .iter()
        .map(|stem| output_dir.join(format!("{stem}_stamped.png")))
        .collect();
    let verified = engine.verify_files(&stamped).unwrap();
    assert!(verified
        .iter()
        .all(|v| v.verification.text.as_deref() == Some("batch")));
}

#[test]
fn missing_directory_reports_failure() {
    let dir = tempdir().unwrap();
    let engine = engine_with("HiddenStamp");
    let results = engine.stamp_directory(&dir.path().join("nope"), dir.path());
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
}

#[test]
fn shared_stems_get_distinct_outputs() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let png = dir.path().join("a.png");
    let jpg = dir.path().join("a.jpg");
    noisy_image(24, 24).save(&png).unwrap();
    noisy_image(24, 24).save(&jpg).unwrap();

    let engine = engine_with("twins");
    let results = engine.stamp_files(&[png, jpg], Some(out.as_path())).unwrap();
    assert!(results.iter().all(|r| r.success));

    let outputs: Vec<PathBuf> = results.iter().filter_map(|r| r.output.clone()).collect();
    assert_eq!(
        outputs,
        vec![out.join("a_stamped.png"), out.join("a_1_stamped.png")]
    );
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
    for output in &outputs {
        let verified = engine.verify_file(output);
        assert_eq!(verified.verification.text.as_deref(), Some("twins"));
    }
}

#[test]
fn rerun_into_input_directory_skips_stamped_outputs() {
    let dir = tempdir().unwrap();
    noisy_image(24, 24).save(dir.path().join("a.png")).unwrap();

    let engine = engine_with("again");
    let first = engine.stamp_directory(dir.path(), dir.path());
    assert_eq!(first.len(), 1);
    assert!(dir.path().join("a_stamped.png").exists());

    let second = engine.stamp_directory(dir.path(), dir.path());
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].path, dir.path().join("a.png"));
    assert!(!dir.path().join("a_stamped_stamped.png").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}
