use anyhow::Result;

use cropdbm::bulk;
use cropdbm::connection::Connection;
use cropdbm::db::Gateway;
use cropdbm::generator::CropGenerator;

const SEED_RECORDS: usize = 1_000;

fn main() -> Result<()> {
    let path = std::path::Path::new("dev/sqlite");
    std::fs::create_dir_all(path)?;
    let db_path = path.join("crops.db");
    let gateway = Gateway::new(Connection::sqlite(db_path.clone()));
    gateway.ensure_schema()?;

    let today = chrono::Local::now().date_naive();
    let mut generator = CropGenerator::seeded(42, today);
    let report = bulk::run(&gateway, &mut generator, SEED_RECORDS, |_| {})?;
    println!(
        "Seeded SQLite at {} with {} crop records",
        db_path.display(),
        report.inserted
    );
    Ok(())
}
