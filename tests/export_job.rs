use std::io::Cursor;
#[cfg(feature = "npz")]
use std::io::Read;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use serde_json::Value;
use uuid::Uuid;

use digit_collector::AppError;
use digit_collector::features::drawing::DrawingStore;
use digit_collector::features::export::{ExportFormat, ExportOptions, ExportOutcome, run_export};
use digit_collector::features::image::TargetSize;

async fn store_with(records: &[(&str, i64, String)]) -> DrawingStore {
    let store = DrawingStore::connect_in_memory().await.expect("connect");
    store.init_schema().await.expect("schema");
    for (user, label, image) in records {
        store.insert(user, *label, image).await.expect("insert");
    }
    store
}

fn gray_png(side: u32, shade: u8) -> String {
    let img = GrayImage::from_pixel(side, side, Luma([shade]));
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode fixture");
    format!("data:image/png;base64,{}", STANDARD.encode(buf))
}

fn scratch_path(ext: &str) -> PathBuf {
    std::fs::create_dir_all("./resources").ok();
    PathBuf::from(format!("./resources/test_export_{}.{ext}", Uuid::new_v4()))
}

#[tokio::test]
async fn empty_store_writes_nothing() {
    let store = store_with(&[]).await;
    let output = scratch_path("json");
    let opts = ExportOptions {
        output: output.clone(),
        ..ExportOptions::default()
    };

    let outcome = run_export(&store, &opts, |_, _| {}).await.expect("export");
    assert_eq!(outcome, ExportOutcome::Empty);
    assert!(!output.exists());
}

#[tokio::test]
async fn json_export_keeps_creation_order_and_resizes() {
    let store = store_with(&[
        ("ann", 1, gray_png(28, 10)),
        ("bob", 2, gray_png(28, 20)),
        ("ann", 3, gray_png(28, 30)),
    ])
    .await;
    let output = scratch_path("json");
    let opts = ExportOptions {
        output: output.clone(),
        format: ExportFormat::Json,
        size: TargetSize::Large,
    };

    let outcome = run_export(&store, &opts, |_, _| {}).await.expect("export");
    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: output.clone(),
            count: 3,
            shape: None,
        }
    );

    let text = std::fs::read_to_string(&output).unwrap();
    // 2 空格缩进
    assert!(text.contains("\n  {\n    \"id\""));
    let rows: Vec<Value> = serde_json::from_str(&text).unwrap();
    let labels: Vec<i64> = rows.iter().map(|r| r["label"].as_i64().unwrap()).collect();
    assert_eq!(labels, vec![1, 2, 3]);
    assert_eq!(rows[1]["username"], "bob");
    assert!(rows[0]["created_at"].as_str().unwrap().contains('T'));

    let image = rows[0]["image"].as_str().unwrap();
    let payload = image.strip_prefix("data:image/png;base64,").unwrap();
    let decoded = image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (280, 280));

    let _ = std::fs::remove_file(&output);
}

#[cfg(feature = "npz")]
#[tokio::test]
async fn numpy_export_writes_three_members() {
    let store = store_with(&[("ann", 4, gray_png(56, 0)), ("bo", 9, gray_png(28, 255))]).await;
    let requested = scratch_path("bin");
    let opts = ExportOptions {
        output: requested.clone(),
        format: ExportFormat::Numpy,
        size: TargetSize::Small,
    };

    let outcome = run_export(&store, &opts, |_, _| {}).await.expect("export");
    let ExportOutcome::Written { path, count, shape } = outcome else {
        panic!("expected written outcome");
    };
    assert_eq!(count, 2);
    assert_eq!(shape, Some((2, 28, 28)));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("npz"));

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["images.npy", "labels.npy", "usernames.npy"]);

    let mut images = Vec::new();
    archive
        .by_name("images.npy")
        .unwrap()
        .read_to_end(&mut images)
        .unwrap();
    assert!(images.starts_with(b"\x93NUMPY"));
    let header_len = u16::from_le_bytes([images[8], images[9]]) as usize;
    let header = std::str::from_utf8(&images[10..10 + header_len]).unwrap();
    assert!(header.contains("'shape': (2, 28, 28)"));
    let data = &images[10 + header_len..];
    assert_eq!(data.len(), 2 * 28 * 28);
    // 第二张为纯白，尺寸相同不重采样
    assert!(data[28 * 28..].iter().all(|p| *p == 255));

    let _ = std::fs::remove_file(&path);
}

#[cfg(not(feature = "npz"))]
#[tokio::test]
async fn numpy_export_without_capability_writes_nothing() {
    let store = store_with(&[("ann", 4, gray_png(28, 0))]).await;
    let requested = scratch_path("npz");
    let opts = ExportOptions {
        output: requested.clone(),
        format: ExportFormat::Numpy,
        size: TargetSize::Small,
    };

    let mut ticks = 0;
    let err = run_export(&store, &opts, |_, _| ticks += 1).await.unwrap_err();
    assert!(matches!(err, AppError::MissingCapability(_)), "got {err:?}");
    assert_eq!(ticks, 0);
    assert!(!requested.exists());
}

#[tokio::test]
async fn malformed_record_aborts_without_output() {
    let store = store_with(&[
        ("ann", 1, gray_png(28, 0)),
        ("bob", 2, "data:image/png;base64,AAAA".to_string()),
    ])
    .await;
    let output = scratch_path("json");
    let opts = ExportOptions {
        output: output.clone(),
        ..ExportOptions::default()
    };

    let err = run_export(&store, &opts, |_, _| {}).await.unwrap_err();
    assert!(matches!(err, AppError::ImageDecode(_)), "got {err:?}");
    assert!(!output.exists());
}

#[tokio::test]
async fn progress_is_reported_every_hundred_records() {
    let image = gray_png(28, 128);
    let records: Vec<(&str, i64, String)> = (0..205).map(|i| ("p", i % 10, image.clone())).collect();
    let store = store_with(&records).await;
    let output = scratch_path("json");
    let opts = ExportOptions {
        output: output.clone(),
        ..ExportOptions::default()
    };

    let mut ticks = Vec::new();
    run_export(&store, &opts, |done, total| ticks.push((done, total)))
        .await
        .expect("export");
    assert_eq!(ticks, vec![(100, 205), (200, 205)]);

    let _ = std::fs::remove_file(&output);
}
