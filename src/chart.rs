use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::{info, warn};

use crate::schema::{float_values, str_values, CONFIRMED, DEATHS, PROVINCE_STATE};
use crate::DataSet;

pub const BAR_CHART_FILE: &str = "confirmed_by_state.svg";
pub const SCATTER_CHART_FILE: &str = "confirmed_vs_deaths.svg";

const SIZE: (u32, u32) = (1200, 600);

/// 州名与确诊数的柱状图
pub fn bar_chart(path: &Path, labels: &[String], values: &[f64]) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = upper_bound(values.iter().copied());
    let n = labels.len().max(1) as u32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Confirmed COVID-19 Cases by State", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(140)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_label_style(
            TextStyle::from(("sans-serif", 11).into_font()).transform(FontTransform::Rotate90),
        )
        .x_desc(PROVINCE_STATE)
        .y_desc("Number of Cases")
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let i = i as u32;
        Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
            BLUE.mix(0.7).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// 确诊数与死亡数的散点图
pub fn scatter_chart(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = upper_bound(points.iter().map(|p| p.0));
    let y_max = upper_bound(points.iter().map(|p| p.1));
    let mut chart = ChartBuilder::on(&root)
        .caption("COVID-19 Confirmed Cases vs. Deaths", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Number of Cases")
        .y_desc("Number of Deaths")
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, RED.mix(0.8).filled())),
    )?;

    root.present()?;
    Ok(())
}

// 坐标轴上界，留 5% 余量，全为 0 或没有数据时给 1
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

/// 在 out_dir 下写出两张图，返回文件路径
pub fn render_charts(ds: &DataSet, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    if ds.height() == 0 {
        warn!("no rows to plot, charts will be empty");
    }

    let states = str_values(ds, PROVINCE_STATE)?;
    let confirmed = float_values(ds, CONFIRMED)?;
    let deaths = float_values(ds, DEATHS)?;

    let (labels, values): (Vec<String>, Vec<f64>) = states
        .into_iter()
        .zip(confirmed.iter())
        .filter_map(|(state, value)| Some((state?, (*value)?)))
        .unzip();
    let points: Vec<(f64, f64)> = confirmed
        .iter()
        .zip(deaths.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    let bar = out_dir.join(BAR_CHART_FILE);
    bar_chart(&bar, &labels, &values)?;
    info!(bars = values.len(), "wrote {}", bar.display());

    let scatter = out_dir.join(SCATTER_CHART_FILE);
    scatter_chart(&scatter, &points)?;
    info!(points = points.len(), "wrote {}", scatter.display());

    Ok(vec![bar, scatter])
}
