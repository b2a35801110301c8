//! Analysis window functions
//!
//! Windows are generated in their periodic (DFT-even) form: a symmetric
//! window of `len + 1` points with the last point dropped.

use crate::error::{Result, SpectroHashError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Named window functions accepted by the transform engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WindowType {
    Boxcar,
    Triang,
    Bartlett,
    #[default]
    Hann,
    Hamming,
    Blackman,
    BlackmanHarris,
    Nuttall,
    FlatTop,
    Parzen,
    Bohman,
    BartHann,
}

/// Name table, aliases after the canonical name
const WINDOW_NAMES: &[(&str, WindowType)] = &[
    ("boxcar", WindowType::Boxcar),
    ("rectangular", WindowType::Boxcar),
    ("triang", WindowType::Triang),
    ("triangular", WindowType::Triang),
    ("bartlett", WindowType::Bartlett),
    ("hann", WindowType::Hann),
    ("hanning", WindowType::Hann),
    ("hamming", WindowType::Hamming),
    ("blackman", WindowType::Blackman),
    ("blackmanharris", WindowType::BlackmanHarris),
    ("nuttall", WindowType::Nuttall),
    ("flattop", WindowType::FlatTop),
    ("parzen", WindowType::Parzen),
    ("bohman", WindowType::Bohman),
    ("barthann", WindowType::BartHann),
];

impl WindowType {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        WINDOW_NAMES
            .iter()
            .find(|(_, window)| window == self)
            .map(|(name, _)| *name)
            .unwrap_or("hann")
    }

    /// Periodic window of `len` points
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        match len {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let mut w = self.symmetric(len + 1);
                w.truncate(len);
                w
            }
        }
    }

    /// Symmetric window of `m` points
    fn symmetric(&self, m: usize) -> Vec<f64> {
        if m == 1 {
            return vec![1.0];
        }
        match self {
            WindowType::Boxcar => vec![1.0; m],
            WindowType::Triang => triang(m),
            WindowType::Bartlett => {
                let half = (m - 1) as f64 / 2.0;
                (0..m)
                    .map(|n| {
                        let n = n as f64;
                        if n <= half {
                            2.0 * n / (m - 1) as f64
                        } else {
                            2.0 - 2.0 * n / (m - 1) as f64
                        }
                    })
                    .collect()
            }
            WindowType::Hann => general_cosine(m, &[0.5, 0.5]),
            WindowType::Hamming => general_cosine(m, &[0.54, 0.46]),
            WindowType::Blackman => general_cosine(m, &[0.42, 0.50, 0.08]),
            WindowType::BlackmanHarris => {
                general_cosine(m, &[0.35875, 0.48829, 0.14128, 0.01168])
            }
            WindowType::Nuttall => {
                general_cosine(m, &[0.3635819, 0.4891775, 0.1365995, 0.0106411])
            }
            WindowType::FlatTop => general_cosine(
                m,
                &[0.21557895, 0.41663158, 0.277263158, 0.083578947, 0.006947368],
            ),
            WindowType::Parzen => parzen(m),
            WindowType::Bohman => bohman(m),
            WindowType::BartHann => (0..m)
                .map(|n| {
                    let fac = (n as f64 / (m - 1) as f64 - 0.5).abs();
                    0.62 - 0.48 * fac + 0.38 * (2.0 * PI * fac).cos()
                })
                .collect(),
        }
    }
}

/// Sum of cosines over `linspace(-pi, pi, m)`
fn general_cosine(m: usize, a: &[f64]) -> Vec<f64> {
    (0..m)
        .map(|n| {
            let fac = -PI + 2.0 * PI * n as f64 / (m - 1) as f64;
            a.iter()
                .enumerate()
                .map(|(k, &ak)| ak * (k as f64 * fac).cos())
                .sum()
        })
        .collect()
}

fn triang(m: usize) -> Vec<f64> {
    let half: Vec<f64> = (1..=(m + 1) / 2)
        .map(|n| {
            let n = n as f64;
            if m % 2 == 0 {
                (2.0 * n - 1.0) / m as f64
            } else {
                2.0 * n / (m + 1) as f64
            }
        })
        .collect();
    let mirrored = if m % 2 == 0 {
        half.iter().rev()
    } else {
        half[..half.len() - 1].iter().rev()
    };
    half.iter().chain(mirrored).copied().collect()
}

fn parzen(m: usize) -> Vec<f64> {
    let mf = m as f64;
    (0..m)
        .map(|i| {
            let n = (i as f64 - (mf - 1.0) / 2.0).abs();
            let r = n / (mf / 2.0);
            if n <= (mf - 1.0) / 4.0 {
                1.0 - 6.0 * r * r + 6.0 * r * r * r
            } else {
                2.0 * (1.0 - r).powi(3)
            }
        })
        .collect()
}

fn bohman(m: usize) -> Vec<f64> {
    (0..m)
        .map(|n| {
            if n == 0 || n == m - 1 {
                return 0.0;
            }
            let fac = (-1.0 + 2.0 * n as f64 / (m - 1) as f64).abs();
            (1.0 - fac) * (PI * fac).cos() + (PI * fac).sin() / PI
        })
        .collect()
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = SpectroHashError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        WINDOW_NAMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, window)| *window)
            .ok_or_else(|| SpectroHashError::config(format!("unknown window type '{s}'")))
    }
}

impl TryFrom<String> for WindowType {
    type Error = SpectroHashError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WindowType> for String {
    fn from(window: WindowType) -> Self {
        window.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hann_window() {
        let window = WindowType::Hann.coefficients(8);
        assert_eq!(window.len(), 8);
        assert_abs_diff_eq!(window[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window[4], 1.0, epsilon = 1e-12);
        // periodic: w[k] == w[n - k]
        assert_abs_diff_eq!(window[1], window[7], epsilon = 1e-12);
    }

    #[test]
    fn test_triang_matches_reference_values() {
        let odd = WindowType::Triang.symmetric(5);
        let expected = [1.0 / 3.0, 2.0 / 3.0, 1.0, 2.0 / 3.0, 1.0 / 3.0];
        for (a, b) in odd.iter().zip(expected) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
        }
        let even = WindowType::Triang.symmetric(4);
        let expected = [0.25, 0.75, 0.75, 0.25];
        for (a, b) in even.iter().zip(expected) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_all_windows_are_finite_and_bounded() {
        for (_, window) in WINDOW_NAMES {
            let w = window.coefficients(256);
            assert_eq!(w.len(), 256);
            assert!(w.iter().all(|v| v.is_finite() && *v <= 1.0 + 1e-6), "{window}");
        }
    }

    #[test]
    fn test_window_names() {
        assert_eq!("HANN".parse::<WindowType>().unwrap(), WindowType::Hann);
        assert_eq!("rectangular".parse::<WindowType>().unwrap(), WindowType::Boxcar);
        assert_eq!(WindowType::Triang.to_string(), "triang");
        assert!(matches!(
            "kaiser".parse::<WindowType>(),
            Err(SpectroHashError::Configuration(_))
        ));
    }
}
