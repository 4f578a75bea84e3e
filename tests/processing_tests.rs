// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the frame processing entry points

use edgeviewer::processing::{
    EdgeOperator, EdgeSettings, FrameProcessor, PixelBuffer, PixelFormat, ProcessingSettings,
    RowBands, Transform,
};
use edgeviewer::{ProcessError, process_to_edges, process_to_gray};

/// Deterministic non-trivial image
fn noise(width: u32, height: u32) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        for _ in 0..3 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            data.push((state >> 24) as u8);
        }
        data.push(255);
    }
    data
}

fn half_black_half_white(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    for _ in 0..height {
        for x in 0..width {
            let v = if x < width / 2 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    data
}

#[test]
fn test_output_length_for_many_sizes() {
    for (w, h) in [(1, 1), (1, 7), (7, 1), (2, 3), (16, 9), (33, 17)] {
        let input = noise(w, h);
        let expected = (w * h * 4) as usize;
        assert_eq!(process_to_gray(&input, w as i32, h as i32).unwrap().len(), expected);
        assert_eq!(process_to_edges(&input, w as i32, h as i32).unwrap().len(), expected);
    }
}

#[test]
fn test_gray_channels_equal() {
    let gray = process_to_gray(&noise(20, 10), 20, 10).unwrap();
    for px in gray.chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}

#[test]
fn test_gray_is_fixed_point() {
    let once = process_to_gray(&noise(13, 11), 13, 11).unwrap();
    let twice = process_to_gray(&once, 13, 11).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_gray_reference_pixel() {
    let input = [100u8, 150, 200, 255].repeat(4);
    let gray = process_to_gray(&input, 2, 2).unwrap();
    assert_eq!(gray, [141u8, 141, 141, 255].repeat(4));
}

#[test]
fn test_uniform_input_has_no_edges() {
    let input = [37u8, 201, 90, 255].repeat(12 * 8);
    let edges = process_to_edges(&input, 12, 8).unwrap();
    for px in edges.chunks_exact(4) {
        assert_eq!(&px[..3], &[0, 0, 0]);
    }
}

#[test]
fn test_vertical_boundary_row() {
    let input = half_black_half_white(4, 1);
    let edges = process_to_edges(&input, 4, 1).unwrap();
    let values: Vec<u8> = edges.chunks_exact(4).map(|px| px[0]).collect();

    assert!(values[1] >= 250 && values[2] >= 250, "boundary: {:?}", values);
    assert!(values[0] <= 5 && values[3] <= 5, "flat sides: {:?}", values);
}

#[test]
fn test_vertical_boundary_tall_frame() {
    let input = half_black_half_white(10, 6);
    let edges = process_to_edges(&input, 10, 6).unwrap();
    for (i, px) in edges.chunks_exact(4).enumerate() {
        let x = i % 10;
        if x == 4 || x == 5 {
            assert_eq!(px[0], 255);
        } else {
            assert_eq!(px[0], 0);
        }
        assert_eq!(px[3], 255);
    }
}

#[test]
fn test_edges_deterministic() {
    let input = noise(31, 19);
    let first = process_to_edges(&input, 31, 19).unwrap();
    let second = process_to_edges(&input, 31, 19).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_length_mismatch_rejected() {
    let input = vec![0u8; 4 * 4 * 4 - 1];
    assert!(matches!(
        process_to_gray(&input, 4, 4),
        Err(ProcessError::InvalidDimensions { .. })
    ));
    assert!(matches!(
        process_to_edges(&input, 4, 4),
        Err(ProcessError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_rgb_frame_rejected_as_unsupported() {
    let result = PixelBuffer::from_format(2, 2, PixelFormat::Rgb8, vec![0u8; 12]);
    assert_eq!(result, Err(ProcessError::UnsupportedFormat(PixelFormat::Rgb8)));
}

#[test]
fn test_canny_output_is_binary_and_thin() {
    let frame = PixelBuffer::new(10, 6, half_black_half_white(10, 6)).unwrap();
    let processor = FrameProcessor::new(ProcessingSettings {
        edge: EdgeSettings {
            operator: EdgeOperator::Canny,
            ..Default::default()
        },
        bands: RowBands::INLINE,
        pool_capacity: None,
    });

    let edges = processor.process(&frame, Transform::Edge);
    assert!(edges.pixels().iter().all(|p| p[0] == 0 || p[0] == 255));
    for y in 0..6 {
        let marked: Vec<u32> = (0..10)
            .filter(|&x| edges.pixel(x, y).map(|p| p[0]) == Some(255))
            .collect();
        assert_eq!(marked, vec![4], "row {}", y);
    }
}

#[test]
fn test_canny_uniform_input_has_no_edges() {
    let frame = PixelBuffer::filled(9, 7, [12, 200, 77, 255]).unwrap();
    let processor = FrameProcessor::new(ProcessingSettings {
        edge: EdgeSettings {
            operator: EdgeOperator::Canny,
            ..Default::default()
        },
        ..Default::default()
    });

    let edges = processor.process(&frame, Transform::Edge);
    assert!(edges.pixels().iter().all(|p| *p == [0, 0, 0, 255]));
}

#[test]
fn test_raw_entry_points_match_frame_processing_above_parallel_threshold() {
    // 320 x 240 = 76800 pixels, enough to split into row bands
    let (w, h) = (320, 240);
    let input = noise(w, h);
    let frame = PixelBuffer::new(w, h, input.clone()).unwrap();
    let inline = FrameProcessor::new(ProcessingSettings {
        bands: RowBands::INLINE,
        pool_capacity: None,
        ..Default::default()
    });

    assert_eq!(
        process_to_gray(&input, w as i32, h as i32).unwrap(),
        inline.process(&frame, Transform::Gray).into_raw()
    );
    assert_eq!(
        process_to_edges(&input, w as i32, h as i32).unwrap(),
        inline.process(&frame, Transform::Edge).into_raw()
    );
}

#[test]
fn test_processor_is_shareable_across_threads() {
    let processor = std::sync::Arc::new(FrameProcessor::default());
    let frame = std::sync::Arc::new(PixelBuffer::new(24, 16, noise(24, 16)).unwrap());
    let expected = process_to_edges(frame.as_bytes(), 24, 16).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let processor = std::sync::Arc::clone(&processor);
            let frame = std::sync::Arc::clone(&frame);
            std::thread::spawn(move || {
                let out = processor.process(&frame, Transform::Edge);
                let bytes = out.as_bytes().to_vec();
                processor.recycle(out);
                bytes
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
