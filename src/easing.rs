//! Easing curves on the unit interval, handy for shaping generative
//! parameters. Each function maps x in [0, 1] to y in [0, 1], though the
//! back and elastic families dip outside the band on the way.
//!
//! Implementations adapted from <https://easings.net>.

use std::f64::consts::PI;

pub fn ease_in_sine(x: f64) -> f64 {
    1.0 - (x * PI / 2.0).cos()
}

pub fn ease_out_sine(x: f64) -> f64 {
    (x * PI / 2.0).sin()
}

pub fn ease_in_out_sine(x: f64) -> f64 {
    -((PI * x).cos() - 1.0) / 2.0
}

/// Polynomial ease in; `n` 2 is quadratic, 3 cubic, and so on.
pub fn ease_in_nth_order(x: f64, n: i32) -> f64 {
    x.powi(n)
}

pub fn ease_out_nth_order(x: f64, n: i32) -> f64 {
    1.0 - (1.0 - x).powi(n)
}

pub fn ease_in_out_nth_order(x: f64, n: i32) -> f64 {
    if x < 0.5 {
        2.0_f64.powi(n - 1) * x.powi(n)
    } else {
        1.0 - (-2.0 * x + 2.0).powi(n) / 2.0
    }
}

pub fn ease_in_expo(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        2.0_f64.powf(10.0 * x - 10.0)
    }
}

pub fn ease_out_expo(x: f64) -> f64 {
    if x == 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * x)
    }
}

pub fn ease_in_out_expo(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x == 1.0 {
        1.0
    } else if x < 0.5 {
        2.0_f64.powf(20.0 * x - 10.0) / 2.0
    } else {
        (2.0 - 2.0_f64.powf(-20.0 * x + 10.0)) / 2.0
    }
}

pub fn ease_in_circ(x: f64) -> f64 {
    1.0 - (1.0 - x * x).sqrt()
}

pub fn ease_out_circ(x: f64) -> f64 {
    (1.0 - (x - 1.0) * (x - 1.0)).sqrt()
}

pub fn ease_in_out_circ(x: f64) -> f64 {
    if x < 0.5 {
        (1.0 - (1.0 - (2.0 * x).powi(2)).sqrt()) / 2.0
    } else {
        ((1.0 - (-2.0 * x + 2.0).powi(2)).sqrt() + 1.0) / 2.0
    }
}

/// Pulls slightly negative before heading for (1, 1); `c` sets how far it
/// digs in, and 0 degenerates to plain cubic easing.
pub fn ease_in_back(x: f64, c: f64) -> f64 {
    (1.0 + c) * x.powi(3) - c * x.powi(2)
}

/// Overshoots past 1 before settling at (1, 1).
pub fn ease_out_back(x: f64, c: f64) -> f64 {
    1.0 + (1.0 + c) * (x - 1.0).powi(3) + c * (x - 1.0).powi(2)
}

pub fn ease_in_out_back(x: f64, c: f64) -> f64 {
    let c2 = c * 1.525;
    if x < 0.5 {
        ((2.0 * x).powi(2) * ((c2 + 1.0) * 2.0 * x - c2)) / 2.0
    } else {
        ((2.0 * x - 2.0).powi(2) * ((c2 + 1.0) * (x * 2.0 - 2.0) + c2) + 2.0) / 2.0
    }
}

/// Wiggles around 0 with growing amplitude before snapping to (1, 1).
pub fn ease_in_elastic(x: f64, c: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x == 1.0 {
        1.0
    } else {
        -(2.0_f64.powf(10.0 * x - 10.0)) * ((x * 10.0 - 10.75) * c).sin()
    }
}

/// Snaps up fast, then rings around 1 until the wiggles damp out.
pub fn ease_out_elastic(x: f64, c: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x == 1.0 {
        1.0
    } else {
        2.0_f64.powf(-10.0 * x) * ((x * 10.0 - 0.75) * c).sin() + 1.0
    }
}

pub fn ease_in_out_elastic(x: f64, c: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x == 1.0 {
        1.0
    } else if x < 0.5 {
        -(2.0_f64.powf(20.0 * x - 10.0) * ((20.0 * x - 11.125) * c).sin()) / 2.0
    } else {
        2.0_f64.powf(-20.0 * x + 10.0) * ((20.0 * x - 11.125) * c).sin() / 2.0 + 1.0
    }
}

/// Default springiness for the elastic in/out pair.
pub const ELASTIC_DEFAULT: f64 = 2.0 * PI / 3.0;
/// Default springiness for [`ease_in_out_elastic`].
pub const ELASTIC_IN_OUT_DEFAULT: f64 = 2.0 * PI / 4.5;
/// Default pull-back for the back family.
pub const BACK_DEFAULT: f64 = 1.7;

pub fn ease_in_bounce(x: f64) -> f64 {
    1.0 - ease_out_bounce(1.0 - x)
}

pub fn ease_out_bounce(x: f64) -> f64 {
    let n = 7.5625;
    let d = 2.75;
    if x < 1.0 / d {
        n * x * x
    } else if x < 2.0 / d {
        n * (x - 1.5 / d).powi(2) + 0.75
    } else if x < 2.5 / d {
        n * (x - 2.25 / d).powi(2) + 0.9375
    } else {
        n * (x - 2.625 / d).powi(2) + 0.984375
    }
}

pub fn ease_in_out_bounce(x: f64) -> f64 {
    if x < 0.5 {
        (1.0 - ease_out_bounce(1.0 - 2.0 * x)) / 2.0
    } else {
        (1.0 + ease_out_bounce(2.0 * x - 1.0)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn check_endpoints(ease: impl Fn(f64) -> f64) {
        assert!(ease(0.0).abs() < EPSILON);
        assert!((ease(1.0) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_all_curves_hit_the_endpoints() {
        check_endpoints(ease_in_sine);
        check_endpoints(ease_out_sine);
        check_endpoints(ease_in_out_sine);
        check_endpoints(|x| ease_in_nth_order(x, 3));
        check_endpoints(|x| ease_out_nth_order(x, 3));
        check_endpoints(|x| ease_in_out_nth_order(x, 3));
        check_endpoints(ease_in_expo);
        check_endpoints(ease_out_expo);
        check_endpoints(ease_in_out_expo);
        check_endpoints(ease_in_circ);
        check_endpoints(ease_out_circ);
        check_endpoints(ease_in_out_circ);
        check_endpoints(|x| ease_in_back(x, BACK_DEFAULT));
        check_endpoints(|x| ease_out_back(x, BACK_DEFAULT));
        check_endpoints(|x| ease_in_out_back(x, BACK_DEFAULT));
        check_endpoints(|x| ease_in_elastic(x, ELASTIC_DEFAULT));
        check_endpoints(|x| ease_out_elastic(x, ELASTIC_DEFAULT));
        check_endpoints(|x| ease_in_out_elastic(x, ELASTIC_IN_OUT_DEFAULT));
        check_endpoints(ease_in_bounce);
        check_endpoints(ease_out_bounce);
        check_endpoints(ease_in_out_bounce);
    }

    #[test]
    fn test_monotone_families_are_monotone() {
        let monotone: [fn(f64) -> f64; 9] = [
            ease_in_sine,
            ease_out_sine,
            ease_in_out_sine,
            ease_in_expo,
            ease_out_expo,
            ease_in_out_expo,
            ease_in_circ,
            ease_out_circ,
            ease_in_out_circ,
        ];
        for ease in monotone {
            let mut previous = ease(0.0);
            for i in 1..=100 {
                let y = ease(i as f64 / 100.0);
                assert!(y >= previous - 1e-12);
                previous = y;
            }
        }
    }

    #[test]
    fn test_back_dips_negative() {
        assert!(ease_in_back(0.2, BACK_DEFAULT) < 0.0);
        assert!(ease_out_back(0.8, BACK_DEFAULT) > 1.0);
    }

    #[test]
    fn test_bounce_stays_in_band() {
        for i in 0..=100 {
            let y = ease_out_bounce(i as f64 / 100.0);
            assert!((0.0..=1.0 + 1e-9).contains(&y));
        }
    }
}
