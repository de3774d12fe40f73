use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate, Utc};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (RegionName, RegionType, StateName, starting value, annual drift, months of missing history)
const REGIONS: &[(&str, &str, &str, f64, f64, usize)] = &[
    ("United States", "country", "", 180_000.0, 0.045, 0),
    ("New York, NY", "msa", "NY", 390_000.0, 0.040, 0),
    ("Los Angeles, CA", "msa", "CA", 520_000.0, 0.055, 0),
    ("San Francisco, CA", "msa", "CA", 780_000.0, 0.050, 0),
    ("Chicago, IL", "msa", "IL", 210_000.0, 0.030, 0),
    ("Dallas, TX", "msa", "TX", 170_000.0, 0.060, 0),
    ("Houston, TX", "msa", "TX", 165_000.0, 0.045, 0),
    ("Austin, TX", "msa", "TX", 230_000.0, 0.075, 0),
    ("Miami, FL", "msa", "FL", 240_000.0, 0.065, 0),
    ("Boise City, ID", "msa", "ID", 190_000.0, 0.080, 48),
    ("Bozeman, MT", "msa", "MT", 310_000.0, 0.070, 96),
    ("Peoria, IL", "msa", "IL", 120_000.0, 0.020, 0),
];

const YEARS_OF_HISTORY: u32 = 15;

fn month_end(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(first)
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_zhvi.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let today = Utc::now().date_naive();
    let this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .context("computing the current month")?;
    let first = this_month
        .checked_sub_months(Months::new(YEARS_OF_HISTORY * 12))
        .context("computing the first month")?;
    let months: Vec<NaiveDate> = (0..YEARS_OF_HISTORY * 12)
        .filter_map(|i| first.checked_add_months(Months::new(i)))
        .collect();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec![
        "RegionID".to_string(),
        "SizeRank".to_string(),
        "RegionName".to_string(),
        "RegionType".to_string(),
        "StateName".to_string(),
    ];
    header.extend(months.iter().map(|m| month_end(*m).format("%Y-%m-%d").to_string()));
    writer.write_record(&header).context("writing header")?;

    for (rank, &(name, kind, state, start, drift, missing)) in REGIONS.iter().enumerate() {
        let mut row = vec![
            (100_000 + rank * 17).to_string(),
            rank.to_string(),
            name.to_string(),
            kind.to_string(),
            state.to_string(),
        ];

        let mut value = start;
        for i in 0..months.len() {
            let monthly = drift / 12.0 + rng.gauss(0.0, 0.004);
            value *= 1.0 + monthly;
            if i < missing {
                row.push(String::new());
            } else {
                row.push(format!("{value:.2}"));
            }
        }
        writer.write_record(&row).with_context(|| format!("writing {name}"))?;
    }

    writer.flush().context("flushing CSV")?;
    println!(
        "Wrote {} regions ({} months each) to {output_path}",
        REGIONS.len(),
        months.len()
    );
    Ok(())
}
