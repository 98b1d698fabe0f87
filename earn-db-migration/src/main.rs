#[tokio::main]
async fn main() {
    sea_orm_migration::cli::run_cli(earn_db_migration::Migrator).await;
}
