use crimecore::calendar::DateInterval;
use crimecore::geo::{Borough, MercatorProjection, BAR_PALETTE_INDEX, PALETTE};
use crimecore::ingest::{self, LoadReport};
use crimecore::scale::{CountScale, TimeScale};
use crimecore::series::DailySeries;
use iced::{
    mouse,
    widget::{
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, text, Column, Container,
    },
    Color, Element, Event, Length, Point, Rectangle, Renderer, Size, Task, Theme,
};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

const INCIDENTS_PATH: &str = "data/allMurders.csv";
const BOUNDARIES_PATH: &str = "data/boroughs.geojson";

const HISTOGRAM_WIDTH: f32 = 1100.0;
const HISTOGRAM_HEIGHT: f32 = 220.0;
const PADDING: f32 = 40.0;
const BAR_WIDTH: f32 = 0.8;
const COUNT_TICKS: usize = 10;
const MAP_SIZE: f32 = 600.0;

fn main() -> iced::Result {
    iced::application(App::boot, App::update, App::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &App) -> String {
    "NYC Crime Map".into()
}

fn application_theme(_: &App) -> Theme {
    Theme::Light
}

/// Incident-side state shared by both canvases once the table has loaded.
///
/// The series is built once and read-only afterwards; the count-axis maximum
/// is pinned here so filtering never rescales the bars.
#[derive(Debug)]
struct Session {
    series: Arc<DailySeries>,
    report: LoadReport,
    max_count: usize,
}

#[derive(Debug)]
struct App {
    session: Option<Session>,
    boroughs: Option<Arc<Vec<Borough>>>,
    selected: DateInterval,
    status: String,
    load_errors: Vec<String>,
}

/// Distinguishes brush gestures from programmatic interval changes, so a
/// system-originated update can never loop back as if the user dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionOrigin {
    User,
    System,
}

#[derive(Debug, Clone)]
enum Message {
    IncidentsLoaded(Result<(Arc<DailySeries>, LoadReport), String>),
    BoundariesLoaded(Result<Arc<Vec<Borough>>, String>),
    IntervalSelected {
        interval: DateInterval,
        origin: SelectionOrigin,
    },
}

impl App {
    fn boot() -> (Self, Task<Message>) {
        (
            App {
                session: None,
                boroughs: None,
                selected: DateInterval::analysis_window(),
                status: "Loading dataset...".into(),
                load_errors: Vec::new(),
            },
            Task::batch([
                Task::perform(load_incidents(), Message::IncidentsLoaded),
                Task::perform(load_boundaries(), Message::BoundariesLoaded),
            ]),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::IncidentsLoaded(Ok((series, report))) => {
                let max_count = series.max_daily_count();
                state.status = format!(
                    "{} incidents over {} days (peak {} per day)",
                    series.total_incidents(),
                    series.buckets().len(),
                    max_count
                );
                state.session = Some(Session {
                    series,
                    report,
                    max_count,
                });
                // Default selection: the full analysis window, so every
                // incident is on the map before any interaction.
                Task::done(Message::IntervalSelected {
                    interval: DateInterval::analysis_window(),
                    origin: SelectionOrigin::System,
                })
            }
            Message::IncidentsLoaded(Err(err)) => {
                state.load_errors.push(format!("Incident load failed: {err}"));
                state.status = "Incident table unavailable".into();
                Task::none()
            }
            Message::BoundariesLoaded(Ok(boroughs)) => {
                state.boroughs = Some(boroughs);
                Task::none()
            }
            Message::BoundariesLoaded(Err(err)) => {
                state
                    .load_errors
                    .push(format!("Boundary load failed: {err}"));
                Task::none()
            }
            Message::IntervalSelected { interval, origin } => {
                state.selected = interval;
                if origin == SelectionOrigin::User {
                    if let Some(session) = &state.session {
                        state.status = format!(
                            "Selection {} -> {} incidents",
                            interval,
                            session.series.incidents_in(interval).len()
                        );
                    }
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let histogram: Element<'_, Message> = match &state.session {
            Some(session) => Canvas::new(TimeHistogram {
                series: session.series.clone(),
                max_count: session.max_count,
            })
            .width(Length::Fixed(HISTOGRAM_WIDTH))
            .height(Length::Fixed(HISTOGRAM_HEIGHT))
            .into(),
            None => text("Loading incident table...").size(16).into(),
        };

        let map: Element<'_, Message> = match &state.boroughs {
            Some(boroughs) => Canvas::new(IncidentMap {
                boroughs: boroughs.clone(),
                series: state.session.as_ref().map(|session| session.series.clone()),
                interval: state.selected,
            })
            .width(Length::Fixed(MAP_SIZE))
            .height(Length::Fixed(MAP_SIZE))
            .into(),
            None => text("Loading borough boundaries...").size(16).into(),
        };

        let mut info = Column::new().spacing(4).push(text(&state.status).size(14));
        if let Some(session) = &state.session {
            if !session.report.clean() {
                info = info.push(
                    text(format!(
                        "Skipped input: {} invalid dates, {} missing coordinates ({} rows read)",
                        session.report.invalid_dates,
                        session.report.missing_coordinates,
                        session.report.rows
                    ))
                    .size(14),
                );
            }
        }
        for error in &state.load_errors {
            info = info.push(
                text(error.clone())
                    .size(14)
                    .color(Color::from_rgb8(0xb0, 0x20, 0x20)),
            );
        }

        let layout = column![
            text("NYC murders, 2006-2016").size(26),
            text("Drag across the histogram to filter the map by date").size(14),
            histogram,
            info,
            map,
        ]
        .spacing(12)
        .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

async fn load_incidents() -> Result<(Arc<DailySeries>, LoadReport), String> {
    let bytes = tokio::fs::read(INCIDENTS_PATH)
        .await
        .map_err(|err| format!("{INCIDENTS_PATH}: {err}"))?;
    let (incidents, report) =
        ingest::read_incidents(bytes.as_slice()).map_err(|err| err.to_string())?;
    let series = DailySeries::build(incidents, DateInterval::analysis_window());
    Ok((Arc::new(series), report))
}

async fn load_boundaries() -> Result<Arc<Vec<Borough>>, String> {
    let bytes = tokio::fs::read(BOUNDARIES_PATH)
        .await
        .map_err(|err| format!("{BOUNDARIES_PATH}: {err}"))?;
    let boroughs = ingest::read_boundaries(bytes.as_slice()).map_err(|err| err.to_string())?;
    Ok(Arc::new(boroughs))
}

fn palette_color(index: usize) -> Color {
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    Color::from_rgb8(r, g, b)
}

/// Daily-count bars over the analysis window plus the brush overlay.
struct TimeHistogram {
    series: Arc<DailySeries>,
    max_count: usize,
}

/// Interaction state of the brush: the drag anchor while a gesture is in
/// progress, and the day-snapped pixel span of the current selection.
#[derive(Debug, Default)]
struct BrushState {
    drag_anchor: Option<f32>,
    snapped: Option<(f32, f32)>,
}

impl TimeHistogram {
    fn time_scale(&self, bounds: Rectangle) -> TimeScale {
        TimeScale::new(self.series.window(), PADDING, bounds.width - PADDING)
    }
}

impl canvas::Program<Message> for TimeHistogram {
    type State = BrushState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let scale = self.time_scale(bounds);
        let plot_left = PADDING;
        let plot_right = bounds.width - PADDING;

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                let anchor = position.x.clamp(plot_left, plot_right);
                let (interval, snapped) = scale.brush_interval(anchor, anchor);
                state.drag_anchor = Some(anchor);
                state.snapped = Some(snapped);
                Some(
                    canvas::Action::publish(Message::IntervalSelected {
                        interval,
                        origin: SelectionOrigin::User,
                    })
                    .and_capture(),
                )
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let anchor = state.drag_anchor?;
                let position = cursor.position_in(bounds)?;
                let (interval, snapped) =
                    scale.brush_interval(anchor, position.x.clamp(plot_left, plot_right));
                state.snapped = Some(snapped);
                Some(
                    canvas::Action::publish(Message::IntervalSelected {
                        interval,
                        origin: SelectionOrigin::User,
                    })
                    .and_capture(),
                )
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => state
                .drag_anchor
                .take()
                .map(|_| canvas::Action::request_redraw()),
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        let scale = self.time_scale(bounds);
        let baseline = bounds.height - PADDING;
        let counts = CountScale::new(self.max_count, baseline, PADDING);
        let axis_color = Color::from_rgb8(0x30, 0x30, 0x30);
        let bar_color = palette_color(BAR_PALETTE_INDEX);

        for daily in self.series.daily_counts() {
            if daily.count == 0 {
                continue;
            }
            let x = scale.position(daily.day);
            let top = counts.position(daily.count);
            frame.fill_rectangle(
                Point::new(x, top),
                Size::new(BAR_WIDTH, baseline - top),
                bar_color,
            );
        }

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(PADDING, PADDING));
            builder.line_to(Point::new(PADDING, baseline));
            builder.line_to(Point::new(bounds.width - PADDING, baseline));
        });
        frame.stroke(&axes, Stroke::default().with_color(axis_color));

        for day in scale.year_ticks() {
            let x = scale.position(day);
            let tick = Path::new(|builder| {
                builder.move_to(Point::new(x, baseline));
                builder.line_to(Point::new(x, baseline + 5.0));
            });
            frame.stroke(&tick, Stroke::default().with_color(axis_color));
            frame.fill_text(canvas::Text {
                content: day.year().to_string(),
                position: Point::new(x - 13.0, baseline + 8.0),
                color: axis_color,
                size: 12.0.into(),
                ..canvas::Text::default()
            });
        }

        for count in counts.ticks(COUNT_TICKS) {
            let y = counts.position(count);
            let tick = Path::new(|builder| {
                builder.move_to(Point::new(PADDING - 5.0, y));
                builder.line_to(Point::new(PADDING, y));
            });
            frame.stroke(&tick, Stroke::default().with_color(axis_color));
            frame.fill_text(canvas::Text {
                content: count.to_string(),
                position: Point::new(10.0, y - 6.0),
                color: axis_color,
                size: 12.0.into(),
                ..canvas::Text::default()
            });
        }

        frame.fill_text(canvas::Text {
            content: "Day".into(),
            position: Point::new(bounds.width / 2.0 - 12.0, bounds.height - 16.0),
            color: axis_color,
            size: 14.0.into(),
            ..canvas::Text::default()
        });
        frame.with_save(|frame| {
            frame.translate(iced::Vector::new(12.0, bounds.height / 2.0 + 40.0));
            frame.rotate(-FRAC_PI_2);
            frame.fill_text(canvas::Text {
                content: "Murders per day".into(),
                position: Point::ORIGIN,
                color: axis_color,
                size: 14.0.into(),
                ..canvas::Text::default()
            });
        });

        if let Some((x0, x1)) = state.snapped {
            frame.fill_rectangle(
                Point::new(x0, PADDING),
                Size::new((x1 - x0).max(1.0), baseline - PADDING),
                Color::from_rgba8(0x49, 0xa1, 0xb4, 0.25),
            );
            let handles = Path::new(|builder| {
                builder.move_to(Point::new(x0, PADDING));
                builder.line_to(Point::new(x0, baseline));
                builder.move_to(Point::new(x1, PADDING));
                builder.line_to(Point::new(x1, baseline));
            });
            frame.stroke(
                &handles,
                Stroke::default()
                    .with_color(Color::from_rgb8(0x2a, 0x6f, 0x7d))
                    .with_width(1.5),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Borough polygons plus one point per incident in the selected interval.
///
/// Geometry is re-projected from the raw coordinates on every draw, so an
/// interval change replaces the whole point set.
struct IncidentMap {
    boroughs: Arc<Vec<Borough>>,
    series: Option<Arc<DailySeries>>,
    interval: DateInterval,
}

impl canvas::Program<Message> for IncidentMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        let projection = MercatorProjection::nyc(bounds.width as f64, bounds.height as f64);

        for (index, borough) in self.boroughs.iter().enumerate() {
            let outline = Path::new(|builder| {
                for ring in &borough.rings {
                    let mut projected = ring
                        .iter()
                        .filter_map(|point| projection.project(*point))
                        .map(|(x, y)| Point::new(x, y));
                    if let Some(first) = projected.next() {
                        builder.move_to(first);
                        for point in projected {
                            builder.line_to(point);
                        }
                        builder.close();
                    }
                }
            });
            frame.fill(&outline, palette_color(index));
        }

        if let Some(series) = &self.series {
            let point_color = Color::from_rgb8(0x22, 0x22, 0x22);
            for incident in series.incidents_in(self.interval) {
                let Some(location) = incident.location else {
                    continue;
                };
                let Some((x, y)) = projection.project(location) else {
                    continue;
                };
                let marker = Path::new(|builder| builder.circle(Point::new(x, y), 2.0));
                frame.fill(&marker, point_color);
            }
        }

        vec![frame.into_geometry()]
    }
}
