//! Coloured terminal summary of a page.

use owo_colors::OwoColorize;
use trawl_page::{ElementId, Page};

pub fn print_page(page: &Page) {
    println!("{} {}", "Title:".bold(), page.title().unwrap_or("(none)"));
    if let Some(url) = page.url() {
        println!("{} {}", "URL:".bold(), url.cyan());
    }
    if let Some(base) = page.base_url() {
        println!("{} {}", "Base:".bold(), base.cyan());
    }

    section("Links", page.links().len());
    for link in page.links() {
        println!("  {} {}", link.href.cyan(), page.text_of(link.element).dimmed());
    }

    section("Images", page.images().len());
    for image in page.images() {
        println!("  {}", image.src.cyan());
    }

    section("Forms", page.forms().len());
    for (index, form) in page.forms().iter().enumerate() {
        let name = form.id().or_else(|| form.name()).unwrap_or("-");
        println!(
            "  {} {} {} {}",
            format!("#{index}").yellow(),
            name.bold(),
            form.method().to_uppercase().green(),
            form.action().unwrap_or("").cyan()
        );
        for &widget in form.widgets() {
            print_widget(page, widget);
        }
    }

    let formless: Vec<ElementId> = page
        .widgets()
        .iter()
        .copied()
        .filter(|widget| !page.forms().iter().any(|form| form.widgets().contains(widget)))
        .collect();
    if !formless.is_empty() {
        section("Widgets outside forms", formless.len());
        for widget in formless {
            print_widget(page, widget);
        }
    }

    if page.has_frames() {
        section("Frames", page.frames().len());
        for frame in page.frames() {
            println!("  {}", frame.src.cyan());
        }
    }
}

fn section(title: &str, count: usize) {
    println!("\n{} {}", format!("=== {title} ===").bold(), format!("({count})").dimmed());
}

fn print_widget(page: &Page, widget: ElementId) {
    let Some(element) = page.element(widget) else {
        return;
    };
    let name = element.attribute("name").unwrap_or("-");
    let label = element
        .label()
        .map(|label| format!(" [{label}]"))
        .unwrap_or_default();
    let value = page
        .widget_value(widget)
        .map(|value| format!(" = {value:?}"))
        .unwrap_or_default();
    println!(
        "    {} {}{}{}",
        element.name().magenta(),
        name,
        label.green(),
        value.dimmed()
    );
}
