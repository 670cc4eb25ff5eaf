use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use encoding_rs::WINDOWS_874;

use contractor_registry::Field;

#[derive(Parser)]
#[command(name = "generate-sample")]
#[command(about = "Write a synthetic contractor registry export")]
struct Args {
    #[arg(short, long, default_value = "lukka68.csv")]
    output: PathBuf,

    #[arg(short, long, default_value_t = 200)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Encode as TIS-620 instead of UTF-8 with BOM
    #[arg(long)]
    tis620: bool,
}

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Log-uniform value in [lo, hi), for skewed money amounts.
    fn log_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        (lo.ln() + self.next_f64() * (hi.ln() - lo.ln())).exp()
    }
}

const PREFIXES: [&str; 6] = ["ศรี", "สยาม", "ไทย", "รุ่งเรือง", "มั่นคง", "เจริญ"];
const TRADES: [&str; 5] = ["ก่อสร้าง", "วิศวกรรม", "โยธา", "คอนสตรัคชั่น", "พัฒนา"];
const GRADES: [&str; 5] = ["A++", "A+", "A", "B", "C"];

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(["รายชื่อลูกค้าผู้รับเหมาก่อสร้าง ปี 2568"])?;
    writer.write_record(Field::ORDER.iter().map(|f| f.label()))?;

    for i in 0..args.rows {
        let mut markers = ["", "", "", ""];
        // Roughly: 60% limited, 25% partnership, 5% public, 5% JV, 5% unmarked.
        match rng.below(20) {
            0..=11 => markers[0] = if rng.below(2) == 0 { "บจก." } else { "บจก" },
            12..=16 => markers[1] = "หจก.",
            17 => markers[2] = "บมจ.",
            18 => markers[3] = "JV",
            _ => {}
        }
        let name = format!(
            "{}{} {}",
            PREFIXES[rng.below(PREFIXES.len())],
            TRADES[rng.below(TRADES.len())],
            i + 1
        );
        // Some cells are left blank or garbled the way real exports are.
        let year = match rng.below(15) {
            0 => String::new(),
            _ => (2500 + rng.below(68)).to_string(),
        };
        let capital = format!("{:.2}", rng.log_uniform(0.5, 500.0));
        let revenue = match rng.below(12) {
            0 => "-".to_string(),
            _ => format!("{:.2}", rng.log_uniform(1.0, 5000.0)),
        };
        let profit = format!("{:.2}", (rng.next_f64() - 0.2) * 100.0);
        let pcts: Vec<String> = (0..4).map(|_| format!("{:.0}", rng.next_f64() * 100.0)).collect();
        let score = format!("{:.0}", rng.next_f64() * 100.0);
        let grade = GRADES[rng.below(GRADES.len())];

        let mut row = vec![(i + 1).to_string()];
        row.extend(markers.iter().map(|m| m.to_string()));
        row.extend([name, year, capital, revenue, profit]);
        row.extend(pcts);
        row.extend([score, grade.to_string()]);
        writer.write_record(&row)?;
    }
    // A blank-name row and a repeated header, both dropped on load.
    writer.write_record(["", "", "", "", "", "", "", "", "", ""])?;
    writer.write_record(Field::ORDER.iter().map(|f| f.label()))?;

    let buf = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;
    let text = String::from_utf8(buf)?;
    let bytes = if args.tis620 {
        let (encoded, _, had_unmappable) = WINDOWS_874.encode(&text);
        anyhow::ensure!(!had_unmappable, "sample text is not representable in TIS-620");
        encoded.into_owned()
    } else {
        let mut out = "\u{feff}".as_bytes().to_vec();
        out.extend_from_slice(text.as_bytes());
        out
    };
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} companies to {} ({})",
        args.rows,
        args.output.display(),
        if args.tis620 { "TIS-620" } else { "UTF-8 with BOM" }
    );
    Ok(())
}
