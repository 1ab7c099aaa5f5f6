use anyhow::Result;
use covidframe::query::{filter_above, sort_by};
use covidframe::{detect_content, retrieve_data, DEFAULT_SOURCE};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let source = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    let ds = detect_content(retrieve_data(&source).await?).load()?;

    // 死亡人数过万的州，按死亡人数排序
    let filtered = sort_by(&filter_above(&ds, "Deaths", 10_000.0)?, "Deaths", true)?;
    println!(
        "{:?}",
        filtered.select(["Province_State", "Confirmed", "Deaths", "Case_Fatality_Ratio"])
    );

    Ok(())
}
