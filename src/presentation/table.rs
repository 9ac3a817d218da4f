// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sortable table view with a totals row.

use crate::models::Activity;
use crate::presentation::format::{
    format_distance, format_duration, format_elevation, format_speed, ActivityMeta,
};
use maud::{html, Markup};

/// Columns the table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Distance,
    Time,
    Speed,
    Elevation,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Distance,
        SortColumn::Time,
        SortColumn::Speed,
        SortColumn::Elevation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Distance => "distance",
            SortColumn::Time => "time",
            SortColumn::Speed => "speed",
            SortColumn::Elevation => "elevation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::Distance => "Distance",
            SortColumn::Time => "Time",
            SortColumn::Speed => "Speed",
            SortColumn::Elevation => "Elevation",
        }
    }

    /// Raw comparison value; missing operands count as zero.
    fn key(self, activity: &Activity) -> f64 {
        let distance = activity.distance.unwrap_or(0.0);
        let moving_time = activity.moving_time.unwrap_or(0) as f64;
        match self {
            SortColumn::Distance => distance,
            SortColumn::Time => moving_time,
            SortColumn::Speed if distance != 0.0 && moving_time != 0.0 => distance / moving_time,
            SortColumn::Speed => 0.0,
            SortColumn::Elevation => activity.total_elevation_gain.unwrap_or(0.0),
        }
    }
}

/// Selected column and direction. The default keeps fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

impl SortState {
    /// State after clicking `column`: a new column sorts descending, the
    /// current column flips direction.
    pub fn clicked(self, column: SortColumn) -> Self {
        if self.column == Some(column) {
            Self {
                column: Some(column),
                ascending: !self.ascending,
            }
        } else {
            Self {
                column: Some(column),
                ascending: false,
            }
        }
    }

    pub fn click(&mut self, column: SortColumn) {
        *self = self.clicked(column);
    }

    /// Parse `sort`/`dir` query values; unknown columns mean unsorted.
    pub fn from_query(sort: Option<&str>, dir: Option<&str>) -> Self {
        match sort.and_then(SortColumn::parse) {
            Some(column) => Self {
                column: Some(column),
                ascending: dir == Some("asc"),
            },
            None => Self::default(),
        }
    }

    /// Query string encoding this state, without the leading `?`.
    pub fn to_query(self) -> String {
        match self.column {
            Some(column) => format!(
                "sort={}&dir={}",
                column.as_str(),
                if self.ascending { "asc" } else { "desc" }
            ),
            None => String::new(),
        }
    }
}

/// One table row, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub position: usize,
    pub id: u64,
    pub name: String,
    pub url: String,
    pub meta: ActivityMeta,
}

/// Sums over every row plus the overall average speed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableTotals {
    pub distance_meters: f64,
    pub moving_time_secs: u64,
    pub elevation_meters: f64,
}

impl TableTotals {
    pub fn of(activities: &[Activity]) -> Self {
        activities.iter().fold(Self::default(), |acc, a| Self {
            distance_meters: acc.distance_meters + a.distance.unwrap_or(0.0),
            moving_time_secs: acc.moving_time_secs + a.moving_time.unwrap_or(0),
            elevation_meters: acc.elevation_meters + a.total_elevation_gain.unwrap_or(0.0),
        })
    }

    /// Formatted totals; speed is total distance over total time, not a mean of row speeds.
    pub fn meta(&self) -> ActivityMeta {
        ActivityMeta {
            distance: format_distance(self.distance_meters),
            time: format_duration(self.moving_time_secs),
            speed: format_speed(self.distance_meters, self.moving_time_secs),
            elevation: format_elevation(self.elevation_meters),
        }
    }
}

/// Everything the table view displays for one sort state.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub sort: SortState,
    pub rows: Vec<TableRow>,
    pub totals: TableTotals,
}

impl TableModel {
    pub fn build(activities: &[Activity], sort: SortState) -> Self {
        let mut ordered: Vec<&Activity> = activities.iter().collect();

        if let Some(column) = sort.column {
            ordered.sort_by(|a, b| {
                let ord = column.key(a).total_cmp(&column.key(b));
                if sort.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        let rows = ordered
            .into_iter()
            .enumerate()
            .map(|(i, a)| TableRow {
                position: i + 1,
                id: a.id,
                name: a.name.clone(),
                url: a.strava_url(),
                meta: ActivityMeta::of(a),
            })
            .collect();

        Self {
            sort,
            rows,
            totals: TableTotals::of(activities),
        }
    }

    /// Render the table. Header links carry the sort state a click produces.
    pub fn render(&self) -> Markup {
        let totals = self.totals.meta();

        html! {
            table class="activity-table" {
                thead {
                    tr {
                        th { "#" }
                        th { "Ride Name" }
                        @for column in SortColumn::ALL {
                            th id=(format!("sort-{}", column.as_str())) {
                                a href=(format!("?{}", self.sort.clicked(column).to_query())) {
                                    (column.label()) (self.sort_icon(column))
                                }
                            }
                        }
                    }
                }
                tbody {
                    @for row in &self.rows {
                        tr {
                            td { (row.position) }
                            td { a href=(row.url) target="_blank" rel="noopener" { (row.name) } }
                            td { (row.meta.distance) }
                            td { (row.meta.time) }
                            td { (row.meta.speed) }
                            td { (row.meta.elevation) }
                        }
                    }
                    tr class="totals" {
                        td {}
                        td { "Total" }
                        td { (totals.distance) }
                        td { (totals.time) }
                        td { (totals.speed) }
                        td { (totals.elevation) }
                    }
                }
            }
        }
    }

    fn sort_icon(&self, column: SortColumn) -> &'static str {
        match self.sort.column {
            Some(c) if c == column && self.sort.ascending => " ▲",
            Some(c) if c == column => " ▼",
            _ => "",
        }
    }
}
