use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, GridMark, Plot, PlotUi};

use crate::state::AppState;

// Charts are static: no pan or zoom, value axis anchored at zero.
const CHART_HEIGHT: f32 = 320.0;
const BAR_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Sales by hour (vertical bars)
// ---------------------------------------------------------------------------

/// Total per hour of day.  Every integer hour gets a tick label and the
/// axis is linear, whichever hours actually have sales.
pub fn hour_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Sales by hour");

    let by_hour = &state.view.by_hour;
    let colors = state.colors;

    Plot::new("sales_by_hour")
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_y(0.0)
        .show_grid([true, false])
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 6.0, 12.0]))
        .x_axis_formatter(hour_tick)
        .x_axis_label("Hour")
        .y_axis_label("Total")
        .show(ui, |plot_ui: &mut PlotUi| {
            let hovered = hovered_slot(plot_ui, false);
            let bars: Vec<Bar> = by_hour
                .iter()
                .map(|&(hour, total)| {
                    let fill = bar_fill(hovered == Some(hour as i64), colors.fill, colors.highlight);
                    Bar::new(hour as f64, total)
                        .width(BAR_WIDTH)
                        .name(format!("{hour:02}:00"))
                        .fill(fill)
                })
                .collect();
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(colors.fill)
                    .element_formatter(Box::new(|bar: &Bar, _: &BarChart| {
                        format!("{:02}:00\n{:.2} $", bar.argument as i64, bar.value)
                    })),
            );
        });
}

/// Label integer marks inside 0..=23 only.
fn hour_tick(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let hour = mark.value.round();
    if (mark.value - hour).abs() < 1e-6 && (0.0..=23.0).contains(&hour) {
        format!("{}", hour as i64)
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Sales by product line (horizontal bars)
// ---------------------------------------------------------------------------

/// Total per product line, smallest at the bottom.
pub fn product_line_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Sales by product line");

    let groups = &state.view.by_product_line;
    let colors = state.colors;
    let names: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

    Plot::new("sales_by_product_line")
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_x(0.0)
        .show_grid([false, true])
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            names.get(slot as usize).cloned().unwrap_or_default()
        })
        .x_axis_label("Total")
        .show(ui, |plot_ui: &mut PlotUi| {
            let hovered = hovered_slot(plot_ui, true);
            let bars: Vec<Bar> = groups
                .iter()
                .enumerate()
                .map(|(i, (name, total))| {
                    let fill = bar_fill(hovered == Some(i as i64), colors.fill, colors.highlight);
                    Bar::new(i as f64, *total)
                        .width(BAR_WIDTH)
                        .name(name)
                        .fill(fill)
                })
                .collect();
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(colors.fill)
                    .element_formatter(Box::new(|bar: &Bar, _: &BarChart| format!("{}\n{:.2} $", bar.name, bar.value))),
            );
        });
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Bar slot under the pointer, if any.  Bars sit on integer arguments, so
/// rounding the pointer's argument coordinate picks the closest one.
fn hovered_slot(plot_ui: &PlotUi, horizontal: bool) -> Option<i64> {
    let pointer = plot_ui.pointer_coordinate()?;
    let argument = if horizontal { pointer.y } else { pointer.x };
    let slot = argument.round();
    ((argument - slot).abs() <= BAR_WIDTH / 2.0).then_some(slot as i64)
}

fn bar_fill(hovered: bool, fill: Color32, highlight: Color32) -> Color32 {
    if hovered {
        highlight
    } else {
        fill
    }
}
