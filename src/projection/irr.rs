//! Return measures over period cash flows: IRR, ROI and CAGR

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 500;
/// Periodic rates are searched within (-99%, +1000%)
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// Net present value of `flows` at a periodic discount rate, first flow undiscounted
pub fn npv(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, &flow)| flow / (1.0 + rate).powi(t as i32))
        .sum()
}

fn npv_derivative(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, &flow)| -(t as f64) * flow / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// Annualised internal rate of return of periodic cash flows.
///
/// Newton-Raphson on the periodic rate, falling back to bisection when the
/// derivative vanishes or Newton does not converge. `None` when the flows have
/// no sign change, since no rate can then zero the NPV.
pub fn annual_irr(flows: &[f64], periods_per_year: u32) -> Option<f64> {
    let has_inflow = flows.iter().any(|&f| f > TOLERANCE);
    let has_outflow = flows.iter().any(|&f| f < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let periodic = newton(flows, 0.01).or_else(|| bisection(flows))?;
    Some((1.0 + periodic).powi(periods_per_year as i32) - 1.0)
}

fn newton(flows: &[f64], guess: f64) -> Option<f64> {
    let mut rate = guess;
    for _ in 0..MAX_ITERATIONS {
        let derivative = npv_derivative(flows, rate);
        if derivative.abs() < 1e-20 {
            return None;
        }
        let next = (rate - npv(flows, rate) / derivative).clamp(RATE_FLOOR, RATE_CEILING);
        if (next - rate).abs() < TOLERANCE {
            // Pinned at a search bound is not a root
            let scale = flows.iter().fold(1.0_f64, |m, f| m.max(f.abs()));
            return (npv(flows, next).abs() < 1e-6 * scale).then_some(next);
        }
        rate = next;
    }
    None
}

fn bisection(flows: &[f64]) -> Option<f64> {
    let (mut low, mut high) = (RATE_FLOOR, RATE_CEILING);
    let mut npv_low = npv(flows, low);
    if npv_low * npv(flows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(flows, mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    None
}

/// Return on investment: `(returned - invested) / invested`. `None` without investment.
pub fn roi(invested: f64, returned: f64) -> Option<f64> {
    if invested > 0.0 {
        Some((returned - invested) / invested)
    } else {
        None
    }
}

/// Compound annual growth rate from `first` to `last` over `years`.
///
/// `None` when either endpoint is not positive or no time has passed.
pub fn cagr(first: f64, last: f64, years: f64) -> Option<f64> {
    if first > 0.0 && last > 0.0 && years > 0.0 {
        Some((last / first).powf(1.0 / years) - 1.0)
    } else {
        None
    }
}
