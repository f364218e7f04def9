//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - Dated files get their modification time set
//! - Undated files move into the undated directory without overwriting
//! - Broken and unsupported files never stop the run

use assert_fs::prelude::*;
use chrono::NaiveDate;
use filetime::FileTime;
use media_retag::core::metadata::CaptureTimestamp;
use media_retag::core::pipeline::{FileOutcome, Pipeline};
use media_retag::core::scanner::ScanConfig;
use media_retag::RetagError;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const QUICKTIME_EPOCH_OFFSET: u32 = 2_082_844_800;

/// Minimal JPEG whose EXIF block holds only an IFD0 DateTime
fn create_test_jpeg(path: &Path, datetime: &str) -> std::io::Result<()> {
    let mut value = datetime.as_bytes().to_vec();
    value.push(0);

    // Header, IFD0 at offset 8 with one entry, data right after it
    let mut tiff = b"MM\0\x2A".to_vec();
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0132u16.to_be_bytes());
    tiff.extend_from_slice(&2u16.to_be_bytes());
    tiff.extend_from_slice(&(value.len() as u32).to_be_bytes());
    tiff.extend_from_slice(&26u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend(value);

    let mut file = File::create(path)?;
    file.write_all(&[0xFF, 0xD8, 0xFF, 0xE1])?;
    file.write_all(&((2 + 6 + tiff.len()) as u16).to_be_bytes())?;
    file.write_all(b"Exif\0\0")?;
    file.write_all(&tiff)?;
    file.write_all(&[0xFF, 0xD9])?;
    Ok(())
}

/// Minimal PNG without any date metadata
fn create_test_png(path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG header
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
        0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC,
        0xCC, 0x59, 0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ])?;
    Ok(())
}

/// `ftyp` followed by `moov` whose first child is a version 0 `mvhd`
fn mov_bytes(creation: u32) -> Vec<u8> {
    let mut ftyp = 16u32.to_be_bytes().to_vec();
    ftyp.extend_from_slice(b"ftypqt  ");
    ftyp.extend_from_slice(&0u32.to_be_bytes());

    let mut mvhd_payload = vec![0u8; 4];
    mvhd_payload.extend_from_slice(&creation.to_be_bytes());
    mvhd_payload.extend_from_slice(&creation.to_be_bytes());
    mvhd_payload.extend_from_slice(&600u32.to_be_bytes());
    mvhd_payload.extend_from_slice(&0u32.to_be_bytes());

    let mut mvhd = ((8 + mvhd_payload.len()) as u32).to_be_bytes().to_vec();
    mvhd.extend_from_slice(b"mvhd");
    mvhd.extend(mvhd_payload);

    let mut moov = ((8 + mvhd.len()) as u32).to_be_bytes().to_vec();
    moov.extend_from_slice(b"moov");
    moov.extend(mvhd);

    ftyp.extend(moov);
    ftyp
}

fn mtime(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap()).unix_seconds()
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
    CaptureTimestamp::Naive(
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap(),
    )
    .unix_timestamp()
}

#[test]
fn pipeline_handles_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();

    assert_eq!(result.total_files, 0);
    assert!(result.outcomes.is_empty());
}

#[test]
fn pipeline_rejects_nonexistent_path() {
    let result = Pipeline::builder()
        .root("/nonexistent/path/that/does/not/exist")
        .build()
        .run();

    assert!(matches!(result, Err(RetagError::Scan(_))));
}

#[test]
fn dated_jpeg_gets_mtime_and_undated_png_moves() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_test_jpeg(&root.join("holiday.jpg"), "2018:02:03 04:05:06").unwrap();
    create_test_png(&root.join("screen.png")).unwrap();

    let result = Pipeline::builder().root(root).build().run().unwrap();

    assert_eq!(result.total_files, 2);
    assert_eq!(result.tagged, 1);
    assert_eq!(result.moved, 1);
    assert_eq!(result.failed, 0);

    assert_eq!(mtime(&root.join("holiday.jpg")), local(2018, 2, 3, 4, 5, 6));
    assert!(!root.join("screen.png").exists());
    assert!(root.join("_NotDated").join("screen.png").exists());
}

#[test]
fn undated_move_never_overwrites_existing_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("_NotDated").create_dir_all().unwrap();
    temp.child("_NotDated/shot.png").write_binary(b"earlier").unwrap();
    temp.child("_NotDated/shot (1).png").write_binary(b"earlier too").unwrap();
    create_test_png(temp.child("shot.png").path()).unwrap();

    let result = Pipeline::builder().root(temp.path()).build().run().unwrap();

    assert_eq!(result.moved, 1);
    temp.child("shot.png").assert(predicate::path::missing());
    temp.child("_NotDated/shot.png").assert("earlier");
    temp.child("_NotDated/shot (1).png").assert("earlier too");
    temp.child("_NotDated/shot (2).png").assert(predicate::path::exists());
}

#[test]
fn mov_creation_time_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clip.MOV");
    // 2015-06-15 12:00:00 UTC
    let unix = 1_434_369_600u32;
    fs::write(&path, mov_bytes(unix + QUICKTIME_EPOCH_OFFSET)).unwrap();

    let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();

    assert_eq!(result.tagged, 1);
    assert_eq!(mtime(&path), i64::from(unix));
}

#[test]
fn pre_1990_dates_are_treated_as_undated() {
    let temp_dir = TempDir::new().unwrap();
    create_test_jpeg(&temp_dir.path().join("scan.jpg"), "1985:07:01 10:00:00").unwrap();

    let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();

    assert_eq!(result.moved, 1);
    assert!(temp_dir.path().join("_NotDated").join("scan.jpg").exists());
}

#[test]
fn corrupt_files_do_not_stop_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a_corrupt.jpg"), b"this is not a valid image file").unwrap();
    fs::write(root.join("b_truncated.mp4"), [0u8, 0, 0]).unwrap();
    fs::write(root.join("c_short.cr3"), b"tiny").unwrap();
    create_test_jpeg(&root.join("d_good.jpg"), "2022:08:09 10:11:12").unwrap();

    let result = Pipeline::builder().root(root).build().run().unwrap();

    assert_eq!(result.total_files, 4);
    assert_eq!(result.moved, 3);
    assert_eq!(result.tagged, 1);
    assert!(matches!(
        result.outcomes.last(),
        Some(FileOutcome::Tagged { .. })
    ));
}

#[test]
fn non_media_files_are_left_alone() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("notes.txt").write_str("hello").unwrap();
    temp.child("clip.mov.bak").write_str("backup").unwrap();

    let result = Pipeline::builder().root(temp.path()).build().run().unwrap();

    assert_eq!(result.total_files, 0);
    temp.child("notes.txt").assert("hello");
    temp.child("clip.mov.bak").assert("backup");
    temp.child("_NotDated").assert(predicate::path::missing());
}

#[test]
fn custom_extension_list_limits_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_test_png(&root.join("keep.png")).unwrap();
    create_test_jpeg(&root.join("photo.jpg"), "2018:02:03 04:05:06").unwrap();

    let config = ScanConfig {
        extensions: Some(vec!["jpg".to_string()]),
        ..Default::default()
    };
    let result = Pipeline::builder()
        .root(root)
        .scan_config(config)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files, 1);
    assert!(root.join("keep.png").exists());
}

#[test]
fn parallel_run_produces_same_outcomes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for i in 0..8 {
        let sub = root.join(format!("dir{}", i % 2));
        fs::create_dir_all(&sub).unwrap();
        if i % 3 == 0 {
            create_test_png(&sub.join(format!("img{}.png", i))).unwrap();
        } else {
            create_test_jpeg(&sub.join(format!("img{}.jpg", i)), "2020:05:06 07:08:09").unwrap();
        }
    }

    let result = Pipeline::builder().root(root).jobs(4).build().run().unwrap();

    assert_eq!(result.total_files, 8);
    assert_eq!(result.moved, 3);
    assert_eq!(result.tagged, 5);
    assert!(root.join("dir0").join("_NotDated").join("img0.png").exists());
    assert!(root.join("dir1").join("_NotDated").join("img3.png").exists());
    assert!(root.join("dir0").join("_NotDated").join("img6.png").exists());
}
