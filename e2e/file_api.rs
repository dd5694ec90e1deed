//! E2E Test Suite: File API
//!
//! Round-trips frames through real files using the `Read`/`Write` adapters:
//! - FrameWriter → file → FrameReader
//! - Multi-block content and tiny read buffers
//! - Checksummed configurations
//! - Concatenated frame files

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use lz4pack::file::{FrameReader, FrameWriter};
use lz4pack::frame::{BlockSizeId, FrameConfig};

fn corpus(len: usize) -> Vec<u8> {
    b"I am the very model of a modern compression general. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn write_frame_file(data: &[u8], config: FrameConfig) -> File {
    let file = tempfile::tempfile().unwrap();
    let mut writer = FrameWriter::new(file, config).unwrap();
    for chunk in data.chunks(4096) {
        writer.write_all(chunk).unwrap();
    }
    let mut file = writer.finish().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    file
}

#[test]
fn round_trip_through_a_real_file() {
    let data = corpus(300 * 1024);
    let file = write_frame_file(&data, FrameConfig::default());
    let mut reader = FrameReader::new(file);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn tiny_read_buffers() {
    let data = corpus(10_000);
    let file = write_frame_file(&data, FrameConfig::default());
    let mut reader = FrameReader::new(file);
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(out, data);
}

#[test]
fn checksummed_configuration_round_trips() {
    let data = corpus(150 * 1024);
    let config = FrameConfig {
        block_size_id: BlockSizeId::Max256Kb,
        content_checksum: true,
        block_checksum: true,
        ..FrameConfig::default()
    };
    let file = write_frame_file(&data, config);
    let mut out = Vec::new();
    FrameReader::new(file).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn empty_frame_file() {
    let file = write_frame_file(b"", FrameConfig::default());
    let mut out = Vec::new();
    FrameReader::new(file).read_to_end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn concatenated_frames_in_one_file() {
    let mut file = tempfile::tempfile().unwrap();
    for part in ["part one. ", "part two. ", "part three."] {
        let mut writer = FrameWriter::new(&mut file, FrameConfig::default()).unwrap();
        writer.write_all(part.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut out = Vec::new();
    FrameReader::new(file).read_to_end(&mut out).unwrap();
    assert_eq!(out, b"part one. part two. part three.");
}

#[test]
fn named_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.lz4");
    let data = corpus(50_000);

    let mut writer =
        FrameWriter::new(File::create(&path).unwrap(), FrameConfig::default()).unwrap();
    writer.write_all(&data).unwrap();
    writer.finish().unwrap();

    let mut out = Vec::new();
    FrameReader::new(File::open(&path).unwrap())
        .read_to_end(&mut out)
        .unwrap();
    assert_eq!(out, data);
}
