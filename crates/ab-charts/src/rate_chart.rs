//! Multi-series conversion rate chart
//!
//! `RateChartLayout` turns a `ChartSnapshot` into pixel geometry once; the
//! Leptos component and the standalone SVG used for export both draw from it.

use crate::{
    ChartDimensions, ChartMargin,
    chartkit::{LinePath, LinearScale, MonotonePath, PathGenerator, PointScale, Scale, area_path},
};
use ab_core::{PercentFormatter, RateFormatter, VariationKey, format_date_label};
use ab_state::{ChartSnapshot, LineStyle, ThemePalette, Zoom, use_dashboard_state};
use leptos::prelude::*;
use std::fmt::Write;
use wasm_bindgen::JsCast;

const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Rate chart configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RateChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: ChartMargin,
    /// Target number of y-axis ticks
    pub y_ticks: usize,
    /// Most date labels drawn on the x axis
    pub max_x_labels: usize,
    pub stroke_width: f64,
    pub area_opacity: f64,
    pub show_grid: bool,
    pub show_legend: bool,
}

impl Default for RateChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 420.0,
            margin: ChartMargin::standard(),
            y_ticks: 5,
            max_x_labels: 8,
            stroke_width: 2.0,
            area_opacity: 0.6,
            show_grid: true,
            show_legend: true,
        }
    }
}

impl RateChartConfig {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn dimensions(&self) -> ChartDimensions {
        ChartDimensions::new(self.width, self.height).with_margin(self.margin)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// One drawn series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayout {
    pub key: VariationKey,
    pub name: String,
    pub color: &'static str,
    /// Stroke path in inner-area coordinates
    pub line: String,
    /// Filled path, area style only
    pub area: Option<String>,
}

/// Axis tick at a position along its axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub x: f64,
    pub name: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub name: String,
    pub color: &'static str,
    pub value: String,
}

/// Hover details for one date
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub date: String,
    /// Absolute x of the hovered date
    pub x: f64,
    pub entries: Vec<TooltipEntry>,
}

/// Pixel geometry for one frame of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct RateChartLayout {
    pub dims: ChartDimensions,
    pub palette: ThemePalette,
    pub line_style: LineStyle,
    pub zoom: Zoom,
    pub stroke_width: f64,
    pub area_opacity: f64,
    pub show_grid: bool,
    pub series: Vec<SeriesLayout>,
    pub y_ticks: Vec<AxisTick>,
    pub x_ticks: Vec<AxisTick>,
    pub legend: Vec<LegendItem>,
    pub tooltips: Vec<TooltipContent>,
}

impl RateChartLayout {
    pub fn compute(snapshot: &ChartSnapshot<'_>, config: &RateChartConfig) -> Self {
        let dims = config.dimensions();
        let inner_w = dims.inner_width();
        let inner_h = dims.inner_height();
        let rows = snapshot.rows;

        let y_scale = LinearScale::new()
            .domain(snapshot.domain.min, snapshot.domain.max)
            .range(inner_h, 0.0);
        let x_scale = PointScale::new(rows.len()).range(0.0, inner_w);

        let generator: &dyn PathGenerator = match snapshot.line_style {
            LineStyle::Line => &LinePath,
            LineStyle::Smooth | LineStyle::Area => &MonotonePath,
        };

        let series = snapshot
            .visible_variations()
            .map(|variation| {
                let points: Vec<(f64, f64)> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        row.rate(&variation.key)
                            .filter(|v| v.is_finite())
                            .map(|v| (x_scale.scale(i), y_scale.scale(v)))
                    })
                    .collect();

                SeriesLayout {
                    key: variation.key.clone(),
                    name: variation.name.clone(),
                    color: variation.color,
                    line: generator.generate(&points),
                    area: (snapshot.line_style == LineStyle::Area)
                        .then(|| area_path(&points, inner_h, generator)),
                }
            })
            .collect();

        let axis_format = PercentFormatter::axis();
        let y_ticks = y_scale
            .nice_ticks(config.y_ticks)
            .into_iter()
            .map(|tick| AxisTick {
                position: y_scale.scale(tick),
                label: axis_format.format(tick),
            })
            .collect();

        let stride = rows.len().div_ceil(config.max_x_labels.max(1)).max(1);
        let x_ticks = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| i % stride == 0)
            .map(|(i, row)| AxisTick {
                position: x_scale.scale(i),
                label: format_date_label(&row.date_str()),
            })
            .collect();

        let legend = if config.show_legend {
            legend_items(snapshot, dims.width)
        } else {
            Vec::new()
        };

        let tooltip_format = PercentFormatter::tooltip();
        let tooltips = rows
            .iter()
            .enumerate()
            .map(|(i, row)| TooltipContent {
                date: format_date_label(&row.date_str()),
                x: dims.margin.left + x_scale.scale(i),
                entries: snapshot
                    .visible_variations()
                    .map(|v| TooltipEntry {
                        name: v.name.clone(),
                        color: v.color,
                        value: tooltip_format.format(row.rate(&v.key).unwrap_or(0.0)),
                    })
                    .collect(),
            })
            .collect();

        Self {
            dims,
            palette: snapshot.theme.palette(),
            line_style: snapshot.line_style,
            zoom: snapshot.zoom,
            stroke_width: config.stroke_width,
            area_opacity: config.area_opacity,
            show_grid: config.show_grid,
            series,
            y_ticks,
            x_ticks,
            legend,
            tooltips,
        }
    }

    /// Row index under an absolute x coordinate
    pub fn nearest_index(&self, x: f64) -> Option<usize> {
        PointScale::new(self.tooltips.len())
            .range(0.0, self.dims.inner_width())
            .nearest(x - self.dims.margin.left)
    }

    pub fn tooltip(&self, index: usize) -> Option<&TooltipContent> {
        self.tooltips.get(index)
    }

    /// y of the legend row
    pub fn legend_y(&self) -> f64 {
        self.dims.height - 16.0
    }

    /// Standalone SVG document of the chart
    pub fn to_svg(&self) -> String {
        let d = &self.dims;
        let p = &self.palette;
        let inner_w = d.inner_width();
        let inner_h = d.inner_height();
        let mut svg = String::with_capacity(4096);

        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{vb}" font-family="{FONT_FAMILY}">"#,
            w = d.width,
            h = d.height,
            vb = d.viewbox(),
        );
        let _ = write!(
            svg,
            r#"<rect width="{}" height="{}" fill="{}"/>"#,
            d.width, d.height, p.background
        );
        let _ = write!(svg, r#"<g transform="{}">"#, d.inner_transform());

        if self.show_grid {
            for tick in &self.y_ticks {
                let _ = write!(
                    svg,
                    r#"<line x1="0" y1="{y:.2}" x2="{inner_w:.2}" y2="{y:.2}" stroke="{}" stroke-dasharray="3 3"/>"#,
                    p.grid,
                    y = tick.position,
                );
            }
        }

        let _ = write!(
            svg,
            r#"<line x1="0" y1="0" x2="0" y2="{inner_h:.2}" stroke="{axis}"/><line x1="0" y1="{inner_h:.2}" x2="{inner_w:.2}" y2="{inner_h:.2}" stroke="{axis}"/>"#,
            axis = p.axis,
        );

        for tick in &self.y_ticks {
            let _ = write!(
                svg,
                r#"<text x="-8" y="{:.2}" dy="0.32em" text-anchor="end" font-size="11" fill="{}">{}</text>"#,
                tick.position,
                p.muted,
                escape_xml(&tick.label)
            );
        }
        for tick in &self.x_ticks {
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="11" fill="{}">{}</text>"#,
                tick.position,
                inner_h + 18.0,
                p.muted,
                escape_xml(&tick.label)
            );
        }

        for series in &self.series {
            if let Some(area) = &series.area {
                let _ = write!(
                    svg,
                    r#"<path d="{area}" fill="{}" fill-opacity="{}" stroke="none"/>"#,
                    series.color, self.area_opacity
                );
            }
            let _ = write!(
                svg,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round" stroke-linecap="round"/>"#,
                series.line, series.color, self.stroke_width
            );
        }
        svg.push_str("</g>");

        let legend_y = self.legend_y();
        for item in &self.legend {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{legend_y:.2}" r="5" fill="{}"/><text x="{:.2}" y="{legend_y:.2}" dy="0.32em" font-size="12" fill="{}">{}</text>"#,
                item.x,
                item.color,
                item.x + LEGEND_SWATCH,
                p.text,
                escape_xml(&item.name)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

const LEGEND_SWATCH: f64 = 10.0;
const LEGEND_GAP: f64 = 20.0;
const LEGEND_CHAR_WIDTH: f64 = 7.0;

/// Legend row centred under the chart
fn legend_items(snapshot: &ChartSnapshot<'_>, width: f64) -> Vec<LegendItem> {
    let widths: Vec<(f64, &ab_core::Variation)> = snapshot
        .visible_variations()
        .map(|v| (LEGEND_SWATCH + v.name.chars().count() as f64 * LEGEND_CHAR_WIDTH, v))
        .collect();

    let total: f64 =
        widths.iter().map(|(w, _)| w).sum::<f64>() + LEGEND_GAP * widths.len().saturating_sub(1) as f64;
    let mut x = ((width - total) / 2.0).max(0.0);

    widths
        .into_iter()
        .map(|(w, v)| {
            let item = LegendItem {
                x,
                name: v.name.clone(),
                color: v.color,
            };
            x += w + LEGEND_GAP;
            item
        })
        .collect()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// COMPONENT
// ============================================================================

/// Conversion rate chart bound to the dashboard state in context
#[component]
pub fn RateChart(#[prop(optional)] config: Option<RateChartConfig>) -> impl IntoView {
    let config = config.unwrap_or_default();
    let dims = config.dimensions();
    let state = use_dashboard_state();
    let dashboard = state.dashboard;

    let layout = Memo::new(move |_| {
        dashboard.with(|d| RateChartLayout::compute(&d.snapshot(), &config))
    });
    let hover = RwSignal::new(None::<usize>);

    let on_move = move |ev: leptos::ev::MouseEvent| {
        let Some(target) = ev
            .current_target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let rect = target.get_bounding_client_rect();
        if rect.width() <= 0.0 {
            return;
        }
        // Client pixels back to viewBox units (the wrapper may be scaled)
        let x = (f64::from(ev.client_x()) - rect.left()) * dims.width / rect.width();
        hover.set(layout.with(|l| l.nearest_index(x)));
    };

    let wrapper_style = move || {
        format!(
            "transform: scale({}); transform-origin: top left;",
            layout.with(|l| l.zoom.factor())
        )
    };

    view! {
        <div id="chart-root" class="chart-wrap" style=wrapper_style>
            <svg
                class="rate-chart"
                width=dims.width
                height=dims.height
                viewBox=dims.viewbox()
                font-family=FONT_FAMILY
                on:mousemove=on_move
                on:mouseleave=move |_| hover.set(None)
            >
                // Background
                <rect
                    width=dims.width
                    height=dims.height
                    fill=move || layout.with(|l| l.palette.background)
                    rx="4"
                />

                <g transform=dims.inner_transform()>
                    // Grid lines
                    {move || {
                        layout.with(|l| {
                            l.show_grid.then(|| {
                                let grid = l.palette.grid;
                                let width = dims.inner_width();
                                l.y_ticks.iter().map(|tick| {
                                    view! {
                                        <line
                                            x1="0" y1=tick.position
                                            x2=width y2=tick.position
                                            stroke=grid
                                            stroke-width="1"
                                            stroke-dasharray="3 3"
                                        />
                                    }
                                }).collect_view()
                            })
                        })
                    }}

                    // Axes
                    {move || {
                        let axis = layout.with(|l| l.palette.axis);
                        view! {
                            <line x1="0" y1="0" x2="0" y2=dims.inner_height() stroke=axis />
                            <line
                                x1="0" y1=dims.inner_height()
                                x2=dims.inner_width() y2=dims.inner_height()
                                stroke=axis
                            />
                        }
                    }}

                    // Y-axis labels
                    {move || {
                        layout.with(|l| {
                            let muted = l.palette.muted;
                            l.y_ticks.iter().map(|tick| {
                                view! {
                                    <text
                                        x="-8"
                                        y=tick.position
                                        dy="0.32em"
                                        text-anchor="end"
                                        font-size="11"
                                        fill=muted
                                    >
                                        {tick.label.clone()}
                                    </text>
                                }
                            }).collect_view()
                        })
                    }}

                    // Date labels
                    {move || {
                        layout.with(|l| {
                            let muted = l.palette.muted;
                            let y = dims.inner_height() + 18.0;
                            l.x_ticks.iter().map(|tick| {
                                view! {
                                    <text
                                        x=tick.position
                                        y=y
                                        text-anchor="middle"
                                        font-size="11"
                                        fill=muted
                                    >
                                        {tick.label.clone()}
                                    </text>
                                }
                            }).collect_view()
                        })
                    }}

                    // Series
                    {move || {
                        layout.with(|l| {
                            let opacity = l.area_opacity;
                            let stroke_width = l.stroke_width;
                            l.series.iter().map(|series| {
                                let area = series.area.clone().map(|d| view! {
                                    <path d=d fill=series.color fill-opacity=opacity stroke="none" />
                                });
                                view! {
                                    <g class="series" data-key=series.key.to_string()>
                                        {area}
                                        <path
                                            d=series.line.clone()
                                            fill="none"
                                            stroke=series.color
                                            stroke-width=stroke_width
                                            stroke-linejoin="round"
                                            stroke-linecap="round"
                                        />
                                    </g>
                                }
                            }).collect_view()
                        })
                    }}
                </g>

                // Hover guide
                {move || {
                    hover.get().and_then(|i| layout.with(|l| l.tooltip(i).map(|t| (t.x, l.palette.axis)))).map(|(x, axis)| {
                        view! {
                            <line
                                class="hover-guide"
                                x1=x y1=dims.margin.top
                                x2=x y2={dims.margin.top + dims.inner_height()}
                                stroke=axis
                                stroke-dasharray="4 2"
                            />
                        }
                    })
                }}

                // Legend
                {move || {
                    layout.with(|l| {
                        let y = l.legend_y();
                        let text = l.palette.text;
                        l.legend.iter().map(|item| {
                            view! {
                                <g class="legend-item">
                                    <circle cx=item.x cy=y r="5" fill=item.color />
                                    <text
                                        x={item.x + LEGEND_SWATCH}
                                        y=y
                                        dy="0.32em"
                                        font-size="12"
                                        fill=text
                                    >
                                        {item.name.clone()}
                                    </text>
                                </g>
                            }
                        }).collect_view()
                    })
                }}
            </svg>

            // Tooltip
            {move || {
                hover.get().and_then(|i| layout.with(|l| l.tooltip(i).cloned())).map(|tip| {
                    view! {
                        <div
                            class="chart-tooltip"
                            style=format!("left: {:.0}px; top: {:.0}px;", tip.x + 12.0, dims.margin.top)
                        >
                            <div class="chart-tooltip__date">{tip.date}</div>
                            {tip.entries.into_iter().map(|entry| {
                                view! {
                                    <div class="chart-tooltip__row">
                                        <span
                                            class="chart-tooltip__dot"
                                            style=format!("background: {}", entry.color)
                                        ></span>
                                        <strong>{entry.name}</strong>
                                        <span class="chart-tooltip__value">{entry.value}</span>
                                    </div>
                                }
                            }).collect_view()}
                        </div>
                    }
                })
            }}
        </div>
    }
}
