use ecoleta_core::{
    discovery::{SourceStatus, ViewModel},
    model::{Category, PointId},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, HomeField, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("ecoleta – find waste collection points")
        .block(Block::default().borders(Borders::ALL).title("Ecoleta"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Home => draw_home(frame, app, *content_area),
        Screen::Points => draw_points(frame, app, *content_area),
        Screen::Detail(point_id) => draw_detail(frame, app, point_id, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::Home => "Type UF and city · Tab switch field · Enter search · Esc/Ctrl-C quit",
        Screen::Points => {
            "←/→ category · Enter/Space toggle · ↑/↓ point · Tab/o details · Esc/b back · q quit"
        }
        Screen::Detail(_) => "Esc/←/b back to map · q/Ctrl-C quit",
    };

    let loading = app
        .discovery
        .as_ref()
        .is_some_and(|discovery| is_loading(&discovery.view()))
        && app.screen == Screen::Points;

    let status_text = if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if loading {
        format!("Loading… · {nav_hint}")
    } else if let (Screen::Points, Some(updated)) = (app.screen, app.points_updated_at) {
        format!("Updated {} · {nav_hint}", updated.format("%H:%M:%S"))
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn is_loading(view: &ViewModel<'_>) -> bool {
    [
        view.location_status,
        view.categories_status,
        view.points_status,
    ]
    .contains(&SourceStatus::Loading)
}

fn draw_home(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [intro_area, uf_area, city_area, _rest] = chunks else {
        return;
    };

    let intro = Paragraph::new(vec![
        Line::from("Your waste collection marketplace").bold(),
        Line::from("We help people find collection points efficiently."),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, *intro_area);

    let fields = [
        (HomeField::Uf, "UF", app.home.uf.as_str(), *uf_area),
        (HomeField::City, "City", app.home.city.as_str(), *city_area),
    ];
    for (field, title, value, field_area) in fields {
        let border_style = if app.home.focus == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
        frame.render_widget(input, field_area);
    }
}

fn draw_points(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(discovery) = app.discovery.as_ref() else {
        return;
    };
    let view = discovery.view();

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [intro_area, map_area, categories_area] = chunks else {
        return;
    };

    let intro = Paragraph::new(vec![
        Line::from("Welcome.").bold(),
        Line::from(format!(
            "Find a collection point on the map · {} / {}",
            view.params.city, view.params.state
        )),
    ]);
    frame.render_widget(intro, *intro_area);

    draw_map(frame, app, &view, *map_area);
    draw_categories(frame, app, &view, *categories_area);
}

fn draw_map(frame: &mut Frame<'_>, app: &App, view: &ViewModel<'_>, area: Rect) {
    let Some(region) = view.map_region() else {
        let (text, style) = if view.permission_notice {
            (
                "Oops! We need your permission to get your location.",
                Style::default().fg(Color::Red),
            )
        } else if view.location_status == SourceStatus::Failed {
            ("Your location is unavailable.", Style::default().fg(Color::Red))
        } else {
            ("Locating…", Style::default().fg(Color::Yellow))
        };
        let paragraph = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Map"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!(
        "Map around {} (±{:.3}°) · {} points",
        region.center,
        region.latitude_delta / 2.0,
        view.visible_points().len()
    );

    let items = if view.visible_points().is_empty() {
        let text = match view.points_status {
            SourceStatus::Loading => "Searching collection points…",
            _ => "No collection points for this filter.",
        };
        vec![ListItem::new(text)]
    } else {
        view.visible_points()
            .iter()
            .map(|point| {
                let marker = if region.contains(point.coordinate()) {
                    "●"
                } else {
                    "○"
                };
                ListItem::new(format!(
                    "{marker} {}  ({})",
                    point.name,
                    point.coordinate()
                ))
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !view.visible_points().is_empty() {
        state.select(Some(app.point_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_categories(frame: &mut Frame<'_>, app: &App, view: &ViewModel<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(filter_title(view));

    if view.categories.is_empty() {
        let text = match view.categories_status {
            SourceStatus::Loading => "Loading items…",
            SourceStatus::Failed => "Items unavailable.",
            SourceStatus::Idle | SourceStatus::Ready => "No items.",
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let chips: Vec<String> = view
        .categories
        .iter()
        .map(|category| chip_label(category, view.is_selected(category.id)))
        .collect();
    let widths: Vec<usize> = chips.iter().map(|chip| chip.chars().count() + 1).collect();
    let available = usize::from(area.width.saturating_sub(2));
    let start = first_visible(&widths, app.category_index, available);

    let spans: Vec<Span<'_>> = view
        .categories
        .iter()
        .zip(chips)
        .enumerate()
        .skip(start)
        .flat_map(|(idx, (category, chip))| {
            let mut style = if view.is_selected(category.id) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if idx == app.category_index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            [Span::styled(chip, style), Span::raw(" ")]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Block title listing the selected items in the order they were picked.
fn filter_title(view: &ViewModel<'_>) -> String {
    let selected: Vec<&str> = view
        .selection
        .iter()
        .filter_map(|id| view.categories.iter().find(|category| category.id == id))
        .map(|category| category.title.as_str())
        .collect();

    if selected.is_empty() {
        "Items (←/→, Enter to filter) · all".to_owned()
    } else {
        format!("Items (←/→, Enter to filter) · {}", selected.join(", "))
    }
}

fn chip_label(category: &Category, selected: bool) -> String {
    let mark = if selected { "✓" } else { " " };
    format!("[{mark} {}]", category.title)
}

/// First chip to draw so the chip under the cursor fits in `available` columns.
fn first_visible(widths: &[usize], cursor: usize, available: usize) -> usize {
    let mut start = cursor;
    let mut used = widths.get(cursor).copied().unwrap_or(0);
    while let Some(previous) = start.checked_sub(1) {
        let Some(width) = widths.get(previous) else {
            break;
        };
        if used + width > available {
            break;
        }
        used += width;
        start = previous;
    }
    start
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, point_id: PointId, area: Rect) {
    let point = app
        .discovery
        .as_ref()
        .and_then(|discovery| discovery.point(point_id));

    let Some(point) = point else {
        let paragraph = Paragraph::new(format!("Point {point_id} is no longer listed."))
            .block(Block::default().borders(Borders::ALL).title("Point"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let lines = vec![
        Line::from(point.name.as_str()).bold(),
        Line::from(format!("{}, {}", point.city, point.state)),
        Line::from(format!("Position: {}", point.coordinate())),
        Line::from(format!("Photo: {}", point.image_uri)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Point #{point_id}")),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ecoleta_core::{
        model::{CategoryId, Coordinate, FilterParams},
        selection::SelectionSet,
    };

    use super::*;

    #[test]
    fn first_visible_scrolls_to_keep_cursor_on_screen() {
        let widths = [10, 10, 10, 10];
        assert_eq!(first_visible(&widths, 0, 25), 0);
        assert_eq!(first_visible(&widths, 1, 25), 0);
        assert_eq!(first_visible(&widths, 3, 25), 2);
        assert_eq!(first_visible(&widths, 3, 100), 0);
    }

    #[test]
    fn chip_marks_selection() {
        let category = Category {
            id: CategoryId(1),
            title: "Óleo".into(),
            icon_uri: String::new(),
        };
        assert_eq!(chip_label(&category, true), "[✓ Óleo]");
        assert_eq!(chip_label(&category, false), "[  Óleo]");
    }

    #[test]
    fn filter_title_follows_selection_order() {
        let params = FilterParams::new("SP", "Sao Paulo");
        let categories: Vec<Category> = [(1, "Lâmpadas"), (2, "Pilhas"), (3, "Óleo")]
            .into_iter()
            .map(|(id, title)| Category {
                id: CategoryId(id),
                title: title.into(),
                icon_uri: String::new(),
            })
            .collect();
        let selection = SelectionSet::new()
            .toggle(CategoryId(3))
            .toggle(CategoryId(1));
        let view = ViewModel {
            params: &params,
            coordinate: Coordinate::SENTINEL,
            categories: &categories,
            points: &[],
            selection: &selection,
            permission_notice: false,
            location_status: SourceStatus::Loading,
            categories_status: SourceStatus::Ready,
            points_status: SourceStatus::Idle,
        };
        assert!(filter_title(&view).ends_with("· Óleo, Lâmpadas"));

        let empty = SelectionSet::new();
        let view = ViewModel {
            selection: &empty,
            ..view
        };
        assert!(filter_title(&view).ends_with("· all"));
    }
}
