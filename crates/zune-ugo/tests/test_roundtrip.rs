/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::Rng;
use zune_ugo::{pack_color, unpack_color, Pixel, PixelBuffer, UgoFormat};

/// What a pixel turns into after a trip through a 16 bit word
fn posterize(pixel: Pixel) -> Pixel {
    unpack_color(pack_color(pixel, true), true)
}

fn random_image(seed: u64, width: usize, height: usize) -> PixelBuffer {
    let mut data = vec![0_u8; width * height * 4];
    nanorand::WyRand::new_seed(seed).fill(&mut data);
    PixelBuffer::from_rgba8(width, height, &data).unwrap()
}

/// An image drawing from at most `colors` distinct opaque colors
fn few_colors_image(seed: u64, width: usize, height: usize, colors: usize) -> PixelBuffer {
    let mut rand = nanorand::WyRand::new_seed(seed);

    let palette: Vec<Pixel> = (0..colors)
        .map(|_| Pixel::new(rand.generate(), rand.generate(), rand.generate(), 255))
        .collect();

    let pixels = (0..width * height)
        .map(|_| palette[rand.generate_range(0..colors)])
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

#[test]
fn test_ntft_round_trip() {
    for (seed, (width, height)) in [(1, 1), (3, 2), (200, 5), (256, 4), (17, 17)]
        .into_iter()
        .enumerate()
    {
        let image = random_image(seed as u64, width, height);
        let encoded = zune_ugo::encode(UgoFormat::NTFT, &image).unwrap();
        let decoded = zune_ugo::decode(UgoFormat::NTFT, &encoded, width, height).unwrap();

        assert_eq!(decoded.dimensions(), image.dimensions());
        for (a, b) in image.pixels().iter().zip(decoded.pixels()) {
            assert_eq!(posterize(*a), *b);
        }
    }
}

#[test]
fn test_nbf_round_trip_exact_palette() {
    for (width, height) in [(7, 3), (256, 192), (100, 1)] {
        let image = few_colors_image(42, width, height, 200);
        let encoded = zune_ugo::encode(UgoFormat::NBF, &image).unwrap();
        let decoded = zune_ugo::decode(UgoFormat::NBF, &encoded, width, height).unwrap();

        for (a, b) in image.pixels().iter().zip(decoded.pixels()) {
            assert_eq!(posterize(*a), *b);
        }
    }
}

#[test]
fn test_nbf_many_colors() {
    let image = random_image(7, 130, 60);
    let encoded = zune_ugo::encode(UgoFormat::NBF, &image).unwrap();
    let decoded = zune_ugo::decode(UgoFormat::NBF, &encoded, 130, 60).unwrap();

    assert_eq!(decoded.dimensions(), (130, 60));
    // NBF has no alpha
    assert!(decoded.pixels().iter().all(|x| x.a == 255));
}

#[test]
fn test_npf_round_trip_with_transparency() {
    let width = 50;
    let height = 9;

    let base = few_colors_image(3, width, height, 15);
    let mut rand = nanorand::WyRand::new_seed(99);

    let pixels: Vec<Pixel> = base
        .pixels()
        .iter()
        .map(|pixel| {
            if rand.generate_range(0_u8..4) == 0 {
                Pixel::new(pixel.r, pixel.g, pixel.b, 100)
            } else {
                *pixel
            }
        })
        .collect();
    let image = PixelBuffer::new(width, height, pixels).unwrap();

    let encoded = zune_ugo::encode(UgoFormat::NPF, &image).unwrap();
    let decoded = zune_ugo::decode(UgoFormat::NPF, &encoded, width, height).unwrap();

    for (a, b) in image.pixels().iter().zip(decoded.pixels()) {
        if a.is_opaque() {
            assert_eq!(posterize(*a), *b);
        } else {
            assert_eq!(*b, Pixel::TRANSPARENT);
        }
    }
}

#[test]
fn test_npf_many_colors_keeps_mask() {
    let image = random_image(11, 33, 33);
    let encoded = zune_ugo::encode(UgoFormat::NPF, &image).unwrap();
    let decoded = zune_ugo::decode(UgoFormat::NPF, &encoded, 33, 33).unwrap();

    let distinct: std::collections::HashSet<Pixel> = decoded
        .pixels()
        .iter()
        .copied()
        .filter(|x| x.is_opaque())
        .collect();

    assert!(distinct.len() <= 15);

    for (a, b) in image.pixels().iter().zip(decoded.pixels()) {
        assert_eq!(a.is_opaque(), b.is_opaque());
    }
}

#[test]
fn test_encoded_sizes() {
    let image = PixelBuffer::new_filled(200, 3, Pixel::new(9, 9, 9, 255));

    assert_eq!(
        zune_ugo::encode(UgoFormat::NTFT, &image).unwrap().len(),
        256 * 3 * 2
    );
    assert_eq!(
        zune_ugo::encode(UgoFormat::NBF, &image).unwrap().len(),
        16 + 512 + 256 * 3
    );
    assert_eq!(
        zune_ugo::encode(UgoFormat::NPF, &image).unwrap().len(),
        16 + 32 + 256 * 3 / 2
    );
}

#[test]
fn test_encode_on_many_threads() {
    let image = random_image(5, 40, 30);
    let quantizer = zune_ugo::MedianCutQuantizer::new();
    let expected = UgoFormat::NBF.encode(&image).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    UgoFormat::NBF
                        .encode_with_quantizer(&image, &quantizer)
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
