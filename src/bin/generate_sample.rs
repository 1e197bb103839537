//! Writes a synthetic supermarket sales dataset in every supported format:
//! `supermarkt_sales.xlsx` (title rows, table at B4:R), `.csv` and `.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};

const ROWS: usize = 1000;
const GROSS_MARGIN: f64 = 4.761904762;

const HEADERS: [&str; 17] = [
    "Invoice ID",
    "Branch",
    "City",
    "Customer_type",
    "Gender",
    "Product line",
    "Unit price",
    "Quantity",
    "Tax 5%",
    "Total",
    "Date",
    "Time",
    "Payment",
    "cogs",
    "gross margin percentage",
    "gross income",
    "Rating",
];

const BRANCHES: [(&str, &str); 3] = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];
const PRODUCT_LINES: [&str; 6] = [
    "Health and beauty",
    "Electronic accessories",
    "Home and lifestyle",
    "Sports and travel",
    "Food and beverages",
    "Fashion accessories",
];
const PAYMENTS: [&str; 3] = ["Ewallet", "Cash", "Credit card"];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct Sale {
    invoice: String,
    branch: &'static str,
    city: &'static str,
    customer_type: &'static str,
    gender: &'static str,
    product_line: &'static str,
    unit_price: f64,
    quantity: i64,
    tax: f64,
    total: f64,
    date: String,
    /// Seconds since midnight.
    time: u32,
    payment: &'static str,
    cogs: f64,
    gross_income: f64,
    rating: f64,
}

impl Sale {
    fn time_text(&self) -> String {
        format!("{:02}:{:02}:00", self.time / 3600, self.time / 60 % 60)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng) -> Vec<Sale> {
    (0..ROWS)
        .map(|_| {
            let (branch, city) = BRANCHES[rng.below(BRANCHES.len())];
            let unit_price = round2(rng.uniform(10.0, 100.0));
            let quantity = 1 + rng.below(10) as i64;
            let cogs = round2(unit_price * quantity as f64);
            let tax = round2(cogs * 0.05);
            Sale {
                invoice: format!(
                    "{:03}-{:02}-{:04}",
                    rng.below(1000),
                    rng.below(100),
                    rng.below(10_000)
                ),
                branch,
                city,
                customer_type: rng.pick(&["Member", "Normal"]),
                gender: rng.pick(&["Female", "Male"]),
                product_line: rng.pick(&PRODUCT_LINES),
                unit_price,
                quantity,
                tax,
                total: round2(cogs + tax),
                date: format!("{}/{}/2019", 1 + rng.below(3), 1 + rng.below(28)),
                // Store hours: 10:00 to 20:59.
                time: 10 * 3600 + 60 * rng.below(11 * 60) as u32,
                payment: rng.pick(&PAYMENTS),
                cogs,
                gross_income: tax,
                rating: (rng.uniform(4.0, 10.0) * 10.0).round() / 10.0,
            }
        })
        .collect()
}

fn write_xlsx(sales: &[Sale], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();
    let time_format = Format::new().set_num_format("hh:mm:ss");

    // Title block above the table; column A stays free for notes.
    sheet.write_string_with_format(0, 1, "Supermarket sales", &bold)?;
    sheet.write_string(1, 1, "Synthetic data, generated by generate_sample")?;
    sheet.write_string(3, 0, "Notes")?;

    for (c, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(3, 1 + c as u16, *header, &bold)?;
    }

    for (i, s) in sales.iter().enumerate() {
        let r = 4 + i as u32;
        sheet.write_string(r, 1, &s.invoice)?;
        sheet.write_string(r, 2, s.branch)?;
        sheet.write_string(r, 3, s.city)?;
        sheet.write_string(r, 4, s.customer_type)?;
        sheet.write_string(r, 5, s.gender)?;
        sheet.write_string(r, 6, s.product_line)?;
        sheet.write_number(r, 7, s.unit_price)?;
        sheet.write_number(r, 8, s.quantity as f64)?;
        sheet.write_number(r, 9, s.tax)?;
        sheet.write_number(r, 10, s.total)?;
        sheet.write_string(r, 11, &s.date)?;
        sheet.write_number_with_format(r, 12, s.time as f64 / 86_400.0, &time_format)?;
        sheet.write_string(r, 13, s.payment)?;
        sheet.write_number(r, 14, s.cogs)?;
        sheet.write_number(r, 15, GROSS_MARGIN)?;
        sheet.write_number(r, 16, s.gross_income)?;
        sheet.write_number(r, 17, s.rating)?;
    }

    workbook.save(path).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_csv(sales: &[Sale], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for s in sales {
        writer.write_record([
            s.invoice.clone(),
            s.branch.to_string(),
            s.city.to_string(),
            s.customer_type.to_string(),
            s.gender.to_string(),
            s.product_line.to_string(),
            s.unit_price.to_string(),
            s.quantity.to_string(),
            s.tax.to_string(),
            s.total.to_string(),
            s.date.clone(),
            s.time_text(),
            s.payment.to_string(),
            s.cogs.to_string(),
            GROSS_MARGIN.to_string(),
            s.gross_income.to_string(),
            s.rating.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(sales: &[Sale], path: &str) -> Result<()> {
    let text = |f: fn(&Sale) -> String| -> ArrayRef {
        Arc::new(StringArray::from(sales.iter().map(f).collect::<Vec<_>>()))
    };
    let number = |f: fn(&Sale) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(sales.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        text(|s| s.invoice.clone()),
        text(|s| s.branch.to_string()),
        text(|s| s.city.to_string()),
        text(|s| s.customer_type.to_string()),
        text(|s| s.gender.to_string()),
        text(|s| s.product_line.to_string()),
        number(|s| s.unit_price),
        Arc::new(Int64Array::from(sales.iter().map(|s| s.quantity).collect::<Vec<_>>())),
        number(|s| s.tax),
        number(|s| s.total),
        text(|s| s.date.clone()),
        text(Sale::time_text),
        text(|s| s.payment.to_string()),
        number(|s| s.cogs),
        number(|_| GROSS_MARGIN),
        number(|s| s.gross_income),
        number(|s| s.rating),
    ];

    let fields: Vec<Field> = HEADERS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let sales = generate(&mut rng);

    write_xlsx(&sales, "supermarkt_sales.xlsx")?;
    write_csv(&sales, "supermarkt_sales.csv")?;
    write_parquet(&sales, "supermarkt_sales.parquet")?;

    println!(
        "Wrote {} transactions to supermarkt_sales.xlsx, .csv and .parquet",
        sales.len()
    );
    Ok(())
}
