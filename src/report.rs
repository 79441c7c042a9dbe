//! Tab-separated text output for the command-line tool.
//!
//! Every writer takes an `impl Write` so the output can be captured. Lines
//! starting with `#` are header lines and are left out when `header` is
//! false.

use std::io::{self, Write};

use crate::data::features::Step;
use crate::data::fit::LinearFit;
use crate::data::model::SampledFunction;

/// Mean, standard deviation, mean squared error and standard error.
pub fn write_stats(out: &mut impl Write, f: &SampledFunction, header: bool) -> io::Result<()> {
    if header {
        writeln!(out, "#mean\tstddev\tmean sq. err.\tstd. err.")?;
    }
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        f.mean(),
        f.stddev(),
        f.mean_squared_error(),
        f.standard_error()
    )
}

/// The fit parameters followed by the fitted line at `points` evenly spaced
/// x values, starting at `xmin` and stopping short of `xmax`.
pub fn write_fit(
    out: &mut impl Write,
    input: &str,
    f: &SampledFunction,
    fit: &LinearFit,
    points: usize,
    header: bool,
) -> io::Result<()> {
    if header {
        writeln!(out, "### Linear Least Squares Fit of data in {input}")?;
        writeln!(out, "## c0  = {}", fit.c0)?;
        writeln!(out, "## c1  = {}", fit.c1)?;
        writeln!(out, "## R^2 = {}", fit.rsq())?;
        writeln!(out)?;
        writeln!(out, "#x\tfit(x)\tstddev")?;
    }
    let xrange = f.xrange();
    let step = xrange.size() / points as f64;
    for k in 0..points {
        let x = xrange.min + k as f64 * step;
        let (value, stddev) = fit.y(x);
        writeln!(out, "{x}\t{value}\t{stddev}")?;
    }
    Ok(())
}

/// One line per step: lower crossing, upper crossing, front width.
pub fn write_steps(out: &mut impl Write, steps: &[Step], header: bool) -> io::Result<()> {
    if header {
        writeln!(out, "#lower\tupper\twidth")?;
    }
    for step in steps {
        writeln!(out, "{}\t{}\t{}", step.lower, step.upper, step.width())?;
    }
    Ok(())
}

/// Answer root and value queries independently.
///
/// Roots of each `ys` entry are printed as `y\t<y>\t<x1>\t<x2>...`, values
/// of each `xs` entry as `x\t<x>\t<f(x)>`. A query outside the sampled range
/// is reported on `err` and the remaining queries still run.
pub fn write_probe(
    out: &mut impl Write,
    err: &mut impl Write,
    f: &SampledFunction,
    ys: &[f64],
    xs: &[f64],
    header: bool,
) -> io::Result<()> {
    if header {
        writeln!(out, "#query\tvalue\tresult")?;
    }
    for &y in ys {
        write!(out, "y\t{y}")?;
        for root in f.x_at(y) {
            write!(out, "\t{root}")?;
        }
        writeln!(out)?;
    }
    for &x in xs {
        match f.y_at(x) {
            Ok(value) => writeln!(out, "x\t{x}\t{value}")?,
            Err(e) if e.is_range_error() => writeln!(err, "range error: {e}")?,
            Err(e) => return Err(io::Error::other(e)),
        }
    }
    Ok(())
}

/// Data summary: elided values, ranges, statistics and peak counts.
pub fn write_info(out: &mut impl Write, label: &str, f: &SampledFunction) -> io::Result<()> {
    writeln!(out, "# {label}")?;
    write!(out, "{f}")?;
    writeln!(out, "samples\t{}", f.len())?;
    writeln!(out, "xrange\t{}\t{}", f.xmin(), f.xmax())?;
    let yrange = f.yrange();
    writeln!(out, "yrange\t{}\t{}", yrange.min, yrange.max)?;
    let peaks = f.detect_peaks(0.0, true);
    writeln!(out, "maxima\t{}", peaks.maxima.len())?;
    writeln!(out, "minima\t{}", peaks.minima.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> SampledFunction {
        SampledFunction::from_xy(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap()
    }

    fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn stats_with_and_without_header() {
        let f = SampledFunction::from_xy(&[0.0, 1.0], &[1.0, 3.0]).unwrap();
        let mut buf = Vec::new();
        write_stats(&mut buf, &f, false).unwrap();
        let sqrt2 = 2f64.sqrt();
        assert_eq!(text(buf), format!("2\t{sqrt2}\t1\t1\n"));

        let mut buf = Vec::new();
        write_stats(&mut buf, &f, true).unwrap();
        assert!(text(buf).starts_with("#mean\tstddev"));
    }

    #[test]
    fn fit_table_stops_short_of_xmax() {
        let f = line();
        let fit = f.linear_least_squares_fit().unwrap();
        let mut buf = Vec::new();
        write_fit(&mut buf, "line.dat", &f, &fit, 3, false).unwrap();
        assert_eq!(text(buf), "0\t1\t0\n1\t3\t0\n2\t5\t0\n");

        let mut buf = Vec::new();
        write_fit(&mut buf, "line.dat", &f, &fit, 3, true).unwrap();
        let out = text(buf);
        assert!(out.starts_with("### Linear Least Squares Fit of data in line.dat\n## c0  = 1\n"));
        assert!(out.contains("## R^2 = 1\n\n#x\tfit(x)\tstddev\n"));
    }

    #[test]
    fn probe_reports_range_errors_and_continues() {
        let f = line();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        write_probe(&mut out, &mut err, &f, &[4.0, 10.0], &[9.0, 1.5], false).unwrap();
        assert_eq!(text(out), "y\t4\t1.5\ny\t10\nx\t1.5\t4\n");
        let err = text(err);
        assert!(err.starts_with("range error: x = 9"));
    }
}
