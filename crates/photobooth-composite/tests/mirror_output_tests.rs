//! Tests output geometry and mirroring on a full-size camera frame.

use image::imageops;
use image::{Rgba, RgbaImage};
use photobooth_composite::composite;
use photobooth_core::{AspectRatio, Bitmap};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn split_video() -> Bitmap {
    // Left half red, right half blue.
    Bitmap::from_image(RgbaImage::from_fn(1920, 1080, |x, _| {
        if x < 960 { RED } else { BLUE }
    }))
}

fn transparent_frame() -> Bitmap {
    Bitmap::from_image(RgbaImage::new(800, 600))
}

#[test]
fn mirror_output_tests_full_hd_capture_is_1200_by_900_and_flipped() {
    let video = split_video();
    let frame = transparent_frame();

    let plain = composite(&video, &frame, false, AspectRatio::FOUR_THREE, 1200)
        .expect("unmirrored composite should succeed");
    let mirrored = composite(&video, &frame, true, AspectRatio::FOUR_THREE, 1200)
        .expect("mirrored composite should succeed");

    assert_eq!((mirrored.width(), mirrored.height()), (1200, 900));
    assert_eq!((plain.width(), plain.height()), (1200, 900));

    let plain_pixels = plain.decode().expect("raster");
    let mirrored_pixels = mirrored.decode().expect("raster");

    assert_eq!(*plain_pixels.get_pixel(10, 450), RED);
    assert_eq!(*plain_pixels.get_pixel(1190, 450), BLUE);
    assert_eq!(*mirrored_pixels.get_pixel(10, 450), BLUE);
    assert_eq!(*mirrored_pixels.get_pixel(1190, 450), RED);

    assert_eq!(imageops::flip_horizontal(&*plain_pixels), *mirrored_pixels);
}

#[test]
fn mirror_output_tests_overlay_is_never_flipped() {
    let video = Bitmap::from_image(RgbaImage::from_pixel(40, 30, Rgba([0, 0, 0, 255])));
    let mut overlay = RgbaImage::new(40, 30);
    for y in 0..30 {
        overlay.put_pixel(0, y, RED);
    }
    let frame = Bitmap::from_image(overlay);

    let output = composite(&video, &frame, true, AspectRatio::FOUR_THREE, 40)
        .expect("composite should succeed");
    let pixels = output.decode().expect("raster");
    assert_eq!(*pixels.get_pixel(0, 15), RED);
    assert_eq!(*pixels.get_pixel(39, 15), Rgba([0, 0, 0, 255]));
}
