//! Plain-text rendering of the sidebar, area picker and forecast grid.

use std::fmt::Write;

use tenki_forecast::{CenterGroup, Fallback, ForecastGrid, GridState, OfficeSelection, WeatherCard};

/// Grid cell width the column count is derived from
const CARD_EXTENT: u32 = 250;

/// Cards per grid line for a given window width (at least one).
pub fn columns_for(window_width: u32) -> usize {
    (window_width / CARD_EXTENT).max(1) as usize
}

pub fn sidebar(groups: &[CenterGroup]) -> String {
    let mut out = String::from("地域一覧\n");
    for group in groups {
        let _ = writeln!(out, "▸ {}", group.name);
        for office in &group.offices {
            let _ = writeln!(out, "    {} {}", office.code, office.name);
        }
    }
    out
}

pub fn picker(selection: &OfficeSelection, selected_area: Option<&str>) -> String {
    let mut out = format!("{} ({})\n", selection.office_name, selection.office_code);
    for option in &selection.options {
        let marker = if Some(option.code.as_str()) == selected_area { "●" } else { "○" };
        let _ = writeln!(out, "  {} {} {}", marker, option.code, option.name);
    }
    out
}

fn card(card: &WeatherCard) -> String {
    format!(
        "{} [{}:{}] {} {} / {}",
        card.date_label(),
        card.icon,
        card.color,
        card.text,
        card.low_label(),
        card.high_label()
    )
}

fn fallback_note(fallback: &Fallback) -> String {
    match fallback {
        Fallback::WeatherArea { requested, used } => {
            format!("※ {} の天気がないため {} を表示", requested, used)
        }
        Fallback::TemperatureArea { used, .. } => format!("※ 気温は {} の値", used),
        Fallback::NoTemperatureSeries => "※ 気温データなし".to_string(),
    }
}

fn ready(grid: &ForecastGrid, columns: usize) -> String {
    let mut out = format!("{} ({})\n", grid.area_name, grid.area_code);
    if let (Some(office), Some(at)) = (&grid.publishing_office, &grid.reported_at) {
        let _ = writeln!(out, "{} 発表 {}", office, at);
    }
    for line in grid.cards.chunks(columns.max(1)) {
        let cells: Vec<String> = line.iter().map(card).collect();
        let _ = writeln!(out, "{}", cells.join("  |  "));
    }
    for fallback in &grid.fallbacks {
        let _ = writeln!(out, "{}", fallback_note(fallback));
    }
    out
}

pub fn grid(state: &GridState, columns: usize) -> String {
    match state {
        GridState::Empty => "地域を選択してください\n".to_string(),
        GridState::Ready(grid) => ready(grid, columns),
        GridState::Failed { message, detail } => {
            format!("データ解析エラー: {}\n  ({})\n", message, detail)
        }
    }
}
