use glyphsieve::edge::canny;
use glyphsieve::filter::{adaptive_threshold, bitwise, morph, to_gray};
use glyphsieve::{AdaptiveParams, CannyParams, PixelGrid, Polarity, StructuringElement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_binary(rng: &mut StdRng, width: usize, height: usize, density: f64) -> PixelGrid {
    let data = (0..width * height)
        .map(|_| if rng.random_bool(density) { 255 } else { 0 })
        .collect();
    PixelGrid::gray(data, width, height).unwrap()
}

fn random_gray(rng: &mut StdRng, width: usize, height: usize) -> PixelGrid {
    let data = (0..width * height).map(|_| rng.random_range(0..=255)).collect();
    PixelGrid::gray(data, width, height).unwrap()
}

fn subset(a: &PixelGrid, b: &PixelGrid) -> bool {
    a.data().iter().zip(b.data()).all(|(&x, &y)| x <= y)
}

#[test]
fn open_and_close_bracket_the_input() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let elements = [
        StructuringElement::square(3).unwrap(),
        StructuringElement::rect(5, 3).unwrap(),
        StructuringElement::cross(3).unwrap(),
    ];
    for trial in 0..12 {
        let width = rng.random_range(4..24);
        let height = rng.random_range(4..24);
        let x = random_binary(&mut rng, width, height, 0.5);
        let se = &elements[trial % elements.len()];

        let opened = morph::open(x.view().unwrap(), se).unwrap();
        let closed = morph::close(x.view().unwrap(), se).unwrap();
        assert!(subset(&opened, &x), "trial {trial}: open not inside input");
        assert!(subset(&x, &closed), "trial {trial}: input not inside close");
        assert!(opened.is_binary() && closed.is_binary());
    }
}

#[test]
fn open_and_close_are_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    let se = StructuringElement::square(3).unwrap();
    for _ in 0..10 {
        let x = random_binary(&mut rng, 17, 13, 0.6);
        let opened = morph::open(x.view().unwrap(), &se).unwrap();
        let reopened = morph::open(opened.view().unwrap(), &se).unwrap();
        assert_eq!(opened, reopened);

        let closed = morph::close(x.view().unwrap(), &se).unwrap();
        let reclosed = morph::close(closed.view().unwrap(), &se).unwrap();
        assert_eq!(closed, reclosed);
    }
}

#[test]
fn double_complement_is_identity() {
    let mut rng = StdRng::seed_from_u64(9);
    for channels in [1usize, 3, 4] {
        let data = (0..6 * 5 * channels).map(|_| rng.random()).collect();
        let grid = PixelGrid::new(data, 6, 5, channels).unwrap();
        assert_eq!(bitwise::not(&bitwise::not(&grid)), grid);
    }
}

#[test]
fn gray_input_passes_through() {
    let mut rng = StdRng::seed_from_u64(1);
    let grid = random_gray(&mut rng, 9, 7);
    assert_eq!(to_gray(&grid).unwrap(), grid);
}

#[test]
fn adaptive_threshold_output_is_binary() {
    let mut rng = StdRng::seed_from_u64(77);
    let grid = random_gray(&mut rng, 31, 19);
    for polarity in [Polarity::BrightOnDark, Polarity::DarkOnBright] {
        let params = AdaptiveParams {
            block_size: 13,
            c: 16,
            polarity,
        };
        let out = adaptive_threshold(grid.view().unwrap(), params).unwrap();
        assert!(out.is_binary());
    }
}

#[test]
fn uniform_image_with_zero_offset() {
    let grid = PixelGrid::filled(8, 6, 1, 120).unwrap();
    let bright = AdaptiveParams {
        block_size: 3,
        c: 0,
        polarity: Polarity::BrightOnDark,
    };
    let dark = AdaptiveParams {
        polarity: Polarity::DarkOnBright,
        ..bright
    };
    assert!(adaptive_threshold(grid.view().unwrap(), bright)
        .unwrap()
        .data()
        .iter()
        .all(|&v| v == 0));
    assert!(adaptive_threshold(grid.view().unwrap(), dark)
        .unwrap()
        .data()
        .iter()
        .all(|&v| v == 255));
}

#[test]
fn canny_on_constant_grid_is_empty() {
    for value in [0u8, 90, 255] {
        let grid = PixelGrid::filled(12, 9, 1, value).unwrap();
        let edges = canny(grid.view().unwrap(), CannyParams::default()).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0));
    }
}
