use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Seeded gaussian noise for the sample files.
///
/// Uniform draws come from splitmix64; the polar Box-Muller method turns
/// two of them into a pair of normal deviates, the second kept for the
/// next call.
struct Noise {
    state: u64,
    spare: Option<f64>,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        Self {
            state: seed,
            spare: None,
        }
    }

    fn uniform(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        // 53 random bits mapped onto [-1, 1)
        (z >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }

    /// A normal deviate with standard deviation `sigma` around zero.
    fn sample(&mut self, sigma: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return sigma * z;
        }
        loop {
            let (u, v) = (self.uniform(), self.uniform());
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return sigma * u * scale;
            }
        }
    }
}

fn write_columns(path: &Path, header: &str, points: &[(f64, f64)]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# {header}")?;
    for (x, y) in points {
        writeln!(out, "{x}\t{y}")?;
    }
    out.flush()?;
    println!("Wrote {} samples to {}", points.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut noise = Noise::seeded(42);

    // one sine period shifted down, 20 samples
    let len = 20;
    let sine: Vec<(f64, f64)> = (0..len)
        .map(|i| {
            let x = i as f64;
            (x, (x / len as f64 * 2.0 * std::f64::consts::PI).sin() - 0.2)
        })
        .collect();
    write_columns(&dir.join("sine.dat"), "x\tsin(2 pi x / 20) - 0.2", &sine)?;

    // excitation front rising at x = 30 and falling at x = 70
    let front: Vec<(f64, f64)> = (0..=1000)
        .map(|i| {
            let x = i as f64 * 0.1;
            let up = 0.5 * (1.0 + ((x - 30.0) / 2.0).tanh());
            let down = 0.5 * (1.0 - ((x - 70.0) / 4.0).tanh());
            (x, -80.0 + 100.0 * up * down + noise.sample(0.5))
        })
        .collect();
    write_columns(&dir.join("front.dat"), "t\tvoltage", &front)?;

    // noisy line y = 2x + 1
    let line: Vec<(f64, f64)> = (0..50)
        .map(|i| {
            let x = i as f64 * 0.2;
            (x, 2.0 * x + 1.0 + noise.sample(0.3))
        })
        .collect();
    write_columns(&dir.join("line.dat"), "x\ty = 2x + 1 + noise", &line)?;

    Ok(())
}
