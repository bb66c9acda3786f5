//! Sample-data seeding for demos and local development.
//!
//! Populates six departments, fifteen KPIs of mixed directionality, and 30
//! days of daily data per KPI. Values are deterministic (a hash of KPI id
//! and day) so repeated demo setups look the same. A store that already has
//! departments is left untouched.

use chrono::{Duration, Utc};
use metrik_core::{
  datapoint::NewDataPoint,
  department::NewDepartment,
  ingest::EntryChannel,
  kpi::{NewKpi, TargetType},
  store::KpiStore,
};

struct SeedKpi {
  name:        &'static str,
  description: &'static str,
  unit:        &'static str,
  target_type: TargetType,
  /// Index into [`DEPARTMENTS`].
  department:  usize,
  low:         f64,
  high:        f64,
  target:      f64,
}

const DEPARTMENTS: [(&str, &str); 6] = [
  ("Sales", "Sales and Revenue Generation"),
  ("Marketing", "Marketing and Customer Acquisition"),
  ("Operations", "Operational Efficiency and Quality"),
  ("Finance", "Financial Performance and Management"),
  ("HR", "Human Resources and Employee Management"),
  ("Customer Service", "Customer Support and Satisfaction"),
];

#[rustfmt::skip]
const KPIS: [SeedKpi; 15] = [
  SeedKpi { name: "Monthly Revenue",       description: "Total monthly revenue",               unit: "$",        target_type: TargetType::HigherBetter, department: 0, low: 50_000.0, high: 150_000.0, target: 100_000.0 },
  SeedKpi { name: "Conversion Rate",       description: "Lead to customer conversion rate",    unit: "%",        target_type: TargetType::HigherBetter, department: 0, low: 60.0,     high: 95.0,      target: 80.0 },
  SeedKpi { name: "Average Deal Size",     description: "Average value per deal",              unit: "$",        target_type: TargetType::HigherBetter, department: 0, low: 50.0,     high: 150.0,     target: 100.0 },
  SeedKpi { name: "Lead Generation",       description: "Number of leads generated",           unit: "leads",    target_type: TargetType::HigherBetter, department: 1, low: 1_000.0,  high: 5_000.0,   target: 3_000.0 },
  SeedKpi { name: "Cost Per Lead",         description: "Average cost to acquire a lead",      unit: "$",        target_type: TargetType::LowerBetter,  department: 1, low: 50.0,     high: 150.0,     target: 100.0 },
  SeedKpi { name: "Website Traffic",       description: "Monthly website visitors",            unit: "visitors", target_type: TargetType::HigherBetter, department: 1, low: 1_000.0,  high: 5_000.0,   target: 3_000.0 },
  SeedKpi { name: "Production Efficiency", description: "Production efficiency percentage",    unit: "%",        target_type: TargetType::HigherBetter, department: 2, low: 60.0,     high: 95.0,      target: 80.0 },
  SeedKpi { name: "Quality Score",         description: "Product quality rating",              unit: "score",    target_type: TargetType::HigherBetter, department: 2, low: 3.5,      high: 5.0,       target: 4.5 },
  SeedKpi { name: "Delivery Time",         description: "Average delivery time",               unit: "days",     target_type: TargetType::LowerBetter,  department: 2, low: 1.0,      high: 10.0,      target: 5.0 },
  SeedKpi { name: "Profit Margin",         description: "Net profit margin",                   unit: "%",        target_type: TargetType::HigherBetter, department: 3, low: 60.0,     high: 95.0,      target: 80.0 },
  SeedKpi { name: "Cash Flow",             description: "Monthly cash flow",                   unit: "$",        target_type: TargetType::HigherBetter, department: 3, low: 50_000.0, high: 150_000.0, target: 100_000.0 },
  SeedKpi { name: "Employee Satisfaction", description: "Employee satisfaction score",         unit: "score",    target_type: TargetType::HigherBetter, department: 4, low: 3.5,      high: 5.0,       target: 4.5 },
  SeedKpi { name: "Turnover Rate",         description: "Employee turnover rate",              unit: "%",        target_type: TargetType::LowerBetter,  department: 4, low: 60.0,     high: 95.0,      target: 80.0 },
  SeedKpi { name: "Customer Satisfaction", description: "Customer satisfaction score",         unit: "score",    target_type: TargetType::HigherBetter, department: 5, low: 3.5,      high: 5.0,       target: 4.5 },
  SeedKpi { name: "Response Time",         description: "Average response time",               unit: "hours",    target_type: TargetType::LowerBetter,  department: 5, low: 1.0,      high: 10.0,      target: 5.0 },
];

const DAYS: i64 = 30;

/// Deterministic value in `[0, 1)` from a KPI id and a day offset
/// (splitmix64 finaliser).
fn noise(kpi_id: i64, day: i64) -> f64 {
  let mut x = (kpi_id as u64)
    .wrapping_mul(0x9E37_79B9_7F4A_7C15)
    .wrapping_add((day as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9));
  x ^= x >> 30;
  x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
  x ^= x >> 27;
  x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
  x ^= x >> 31;
  (x >> 11) as f64 / (1u64 << 53) as f64
}

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

/// Seed the store unless it already has departments.
pub async fn seed_sample_data<S>(store: &S) -> anyhow::Result<()>
where
  S: KpiStore,
{
  if !store.list_departments().await?.is_empty() {
    tracing::info!("store already has departments, skipping seed");
    return Ok(());
  }

  let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
  for (name, description) in DEPARTMENTS {
    let dept = store
      .insert_department(NewDepartment {
        name:        name.to_string(),
        description: description.to_string(),
      })
      .await?;
    department_ids.push(dept.id);
  }

  let base = Utc::now() - Duration::days(DAYS);
  let created_by = EntryChannel::Seed.default_created_by().to_string();
  let mut points = Vec::with_capacity(KPIS.len() * DAYS as usize);

  for seed in &KPIS {
    let kpi = store
      .insert_kpi(NewKpi {
        name:          seed.name.to_string(),
        description:   seed.description.to_string(),
        unit:          seed.unit.to_string(),
        target_type:   seed.target_type,
        department_id: department_ids[seed.department],
        is_active:     true,
      })
      .await?;

    for day in 0..DAYS {
      let value =
        seed.low + noise(kpi.id, day) * (seed.high - seed.low);
      points.push(NewDataPoint {
        kpi_id:     kpi.id,
        value:      round2(value),
        target:     Some(seed.target),
        timestamp:  base + Duration::days(day),
        period:     "daily".to_string(),
        notes:      String::new(),
        created_by: created_by.clone(),
      });
    }
  }

  let inserted = store.insert_data_points(points).await?;
  tracing::info!(
    departments = department_ids.len(),
    kpis = KPIS.len(),
    data_points = inserted.len(),
    "sample data seeded"
  );

  Ok(())
}
