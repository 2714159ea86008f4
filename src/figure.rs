use std::path::Path;

use log::warn;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use strum::IntoEnumIterator;

use crate::{
    catalog::GalaxyCatalog,
    selection::{argsort_by_distance, SimSelection},
    settings::{self, Marker, PaperStyle, SimulationId},
};

/// Distances of the marker-size legend rows [Mpc]
const LEGEND_DISTANCES_MPC: [f64; 3] = [0.5, 1.5, 2.5];

const SILVER: RGBColor = RGBColor(192, 192, 192);
const GREY: RGBColor = RGBColor(128, 128, 128);

/// Scatter marker as a composed element anchored at `at`
///
/// A non-filled style draws the marker outline only
pub fn marker_element<DB, C>(
    marker: Marker,
    at: C,
    radius: f64,
    style: ShapeStyle,
) -> DynElement<'static, DB, C>
where
    DB: DrawingBackend + 'static,
    C: Clone + 'static,
{
    let r = radius.round() as i32;
    match marker {
        Marker::Circle | Marker::Dot => Circle::new(at, r, style).into_dyn(),
        Marker::Triangle => {
            let h = (radius * 3f64.sqrt() / 2.).round() as i32;
            let v = (radius / 2.).round() as i32;
            let vertices = vec![(0, -r), (h, v), (-h, v), (0, -r)];
            if style.filled {
                (EmptyElement::<C, DB>::at(at) + Polygon::new(vertices, style)).into_dyn()
            } else {
                (EmptyElement::<C, DB>::at(at) + PathElement::new(vertices, style)).into_dyn()
            }
        }
        Marker::Square => {
            let half = (radius / 2f64.sqrt()).round() as i32;
            (EmptyElement::<C, DB>::at(at) + Rectangle::new([(-half, -half), (half, half)], style))
                .into_dyn()
        }
        Marker::Diamond => {
            let vertices = vec![(0, -r), (r, 0), (0, r), (-r, 0), (0, -r)];
            if style.filled {
                (EmptyElement::<C, DB>::at(at) + Polygon::new(vertices, style)).into_dyn()
            } else {
                (EmptyElement::<C, DB>::at(at) + PathElement::new(vertices, style)).into_dyn()
            }
        }
    }
}

/// Effective radius vs surface brightness selection-criteria figure
pub struct SelectionFigure {
    width: u32,
    height: u32,
    marker_size_prefactor: f64,
    dist_index: f64,
    mu_e_limits: (f64, f64),
    re_limits: (f64, f64),
}
impl Default for SelectionFigure {
    fn default() -> Self {
        let style = PaperStyle::default();
        Self {
            width: style.width,
            height: style.height,
            marker_size_prefactor: style.marker_size_prefactor,
            dist_index: style.dist_index,
            mu_e_limits: settings::mu_e_limits(),
            re_limits: settings::re_limits(),
        }
    }
}
impl SelectionFigure {
    /// Applies the style sheet overrides
    pub fn with_style(self, style: &PaperStyle) -> Self {
        Self {
            width: style.width,
            height: style.height,
            marker_size_prefactor: style.marker_size_prefactor,
            dist_index: style.dist_index,
            ..self
        }
    }
    pub fn mu_e_limits(self, mu_e_limits: (f64, f64)) -> Self {
        Self { mu_e_limits, ..self }
    }
    pub fn re_limits(self, re_limits: (f64, f64)) -> Self {
        Self { re_limits, ..self }
    }
    /// Marker radius [px] of a galaxy `dist` kpc away from its nearest host
    pub fn marker_radius(&self, dist: f64, marker: Marker) -> f64 {
        (self.marker_size_prefactor * marker.area_boost() / dist.powf(self.dist_index)).sqrt()
    }
    /// Renders the figure, the backend is chosen from the file extension
    pub fn render<P: AsRef<Path>>(&self, catalog: &GalaxyCatalog, path: P) {
        let size = (self.width, self.height);
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("svg") => self.draw(
                &SVGBackend::new(path.as_ref(), size).into_drawing_area(),
                catalog,
            ),
            _ => self.draw(
                &BitMapBackend::new(path.as_ref(), size).into_drawing_area(),
                catalog,
            ),
        }
    }
    fn draw<DB: DrawingBackend + 'static>(&self, plot: &DrawingArea<DB, Shift>, catalog: &GalaxyCatalog) {
        let dist = catalog.nearest_host_distance();
        let order = argsort_by_distance(&dist);
        // (mu_e, re, radius) triples of the masked galaxies, nearest first
        let sized_points = |mask: &[bool], marker: Marker| -> Vec<(f64, f64, f64)> {
            order
                .iter()
                .filter(|&&k| mask[k])
                .filter_map(|&k| {
                    dist[k].map(|d| (catalog.mu_e[k], catalog.re[k], self.marker_radius(d, marker)))
                })
                .collect()
        };
        let n_missing = (0..catalog.len()).filter(|&k| dist[k].is_none()).count();
        if n_missing > 0 {
            warn!("{} galaxies without a host distance are not drawn", n_missing);
        }

        plot.fill(&WHITE).unwrap();
        let mut chart = ChartBuilder::on(plot)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(
                self.mu_e_limits.0..self.mu_e_limits.1,
                self.re_limits.0..self.re_limits.1,
            )
            .unwrap();
        chart
            .configure_mesh()
            .x_desc("mu_e [mag arcsec^-2]")
            .y_desc("R_e [kpc]")
            .draw()
            .unwrap();

        for sim_id in SimulationId::iter() {
            let style = sim_id.style();
            let selection = SimSelection::new(catalog, sim_id);

            let fiducial = sized_points(&selection.fiducial, style.marker);
            chart
                .draw_series(fiducial.into_iter().map(|(mu_e, re, radius)| {
                    marker_element(style.marker, (mu_e, re), radius, style.color.filled())
                }))
                .unwrap()
                .label(sim_id.to_string())
                .legend(move |(x, y)| {
                    marker_element(style.marker, (x + 10, y), 5., style.color.filled())
                });

            let borderline = sized_points(&selection.borderline, style.marker);
            chart
                .draw_series(borderline.into_iter().map(|(mu_e, re, radius)| {
                    marker_element(style.marker, (mu_e, re), radius, style.color.mix(0.5).filled())
                }))
                .unwrap();

            let field = sized_points(&selection.field, style.marker);
            chart
                .draw_series(field.into_iter().map(|(mu_e, re, radius)| {
                    marker_element(style.marker, (mu_e, re), radius, SILVER.stroke_width(2))
                }))
                .unwrap();
        }

        // lenient criteria guide lines
        let (mu_e0, mu_e1) = self.mu_e_limits;
        let (re0, re1) = self.re_limits;
        chart
            .draw_series(DashedLineSeries::new(
                vec![
                    (settings::MU_E_LENIENT, re0),
                    (settings::MU_E_LENIENT, re1),
                ],
                2,
                4,
                GREY.stroke_width(1),
            ))
            .unwrap();
        chart
            .draw_series(DashedLineSeries::new(
                vec![
                    (mu_e0, settings::RE_LENIENT_KPC),
                    (mu_e1, settings::RE_LENIENT_KPC),
                ],
                2,
                4,
                GREY.stroke_width(1),
            ))
            .unwrap();
        // fiducial criteria guide lines
        chart
            .draw_series(DashedLineSeries::new(
                vec![
                    (settings::MU_E_FIDUCIAL, re0),
                    (settings::MU_E_FIDUCIAL, re1),
                ],
                8,
                5,
                BLACK.stroke_width(1),
            ))
            .unwrap();
        chart
            .draw_series(DashedLineSeries::new(
                vec![
                    (mu_e0, settings::RE_FIDUCIAL_KPC),
                    (mu_e1, settings::RE_FIDUCIAL_KPC),
                ],
                8,
                5,
                BLACK.stroke_width(1),
            ))
            .unwrap();

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.75))
            .position(SeriesLabelPosition::UpperMiddle)
            .draw()
            .unwrap();

        self.distance_legend(plot);
    }
    /// Marker-size legend: one row of simulation markers per reference distance
    fn distance_legend<DB: DrawingBackend + 'static>(&self, plot: &DrawingArea<DB, Shift>) {
        let (width, _) = plot.dim_in_pixel();
        let row_height = 34i32;
        let box_width = 160i32;
        let box_height = 30 + row_height * LEGEND_DISTANCES_MPC.len() as i32;
        let x0 = width as i32 - box_width - 20;
        let y0 = 50i32;

        plot.draw(&Rectangle::new(
            [(x0, y0), (x0 + box_width, y0 + box_height)],
            WHITE.mix(0.75).filled(),
        ))
        .unwrap();
        plot.draw(&Rectangle::new(
            [(x0, y0), (x0 + box_width, y0 + box_height)],
            BLACK.stroke_width(1),
        ))
        .unwrap();
        plot.draw(&Text::new(
            "d_nearest [Mpc]",
            (x0 + 12, y0 + 8),
            ("sans-serif", 16).into_font(),
        ))
        .unwrap();
        for (row, &d_mpc) in LEGEND_DISTANCES_MPC.iter().enumerate() {
            let y = y0 + 30 + row_height * row as i32 + row_height / 2;
            for (column, sim_id) in SimulationId::iter().enumerate() {
                let marker = sim_id.style().marker;
                let radius = self.marker_radius(d_mpc * 1e3, marker);
                plot.draw(&marker_element(
                    marker,
                    (x0 + 24 + 32 * column as i32, y),
                    radius,
                    BLACK.filled(),
                ))
                .unwrap();
            }
            plot.draw(&Text::new(
                format!("{d_mpc}"),
                (x0 + box_width - 36, y - 8),
                ("sans-serif", 16).into_font(),
            ))
            .unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;

    #[test]
    fn marker_radius_shrinks_with_distance() {
        let figure = SelectionFigure::default();
        let radii: Vec<f64> = [250., 500., 1000., 2500.]
            .iter()
            .map(|&d| figure.marker_radius(d, Marker::Circle))
            .collect();
        assert!(radii.windows(2).all(|r| r[0] > r[1]));
    }

    #[test]
    fn dot_marker_area_boost() {
        let figure = SelectionFigure::default();
        let circle = figure.marker_radius(500., Marker::Circle);
        let dot = figure.marker_radius(500., Marker::Dot);
        assert!((dot / circle - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn render_creates_the_figure_file() {
        let path = std::env::temp_dir().join("udg_selection_criteria.svg");
        SelectionFigure::default().render(&catalog(), &path);
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
        std::fs::remove_file(path).unwrap();
    }
}
