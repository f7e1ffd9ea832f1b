use console::Style;
use movediff::{FragmentKind, MoveDiff};

const COLORS: [fn(Style) -> Style; 4] = [Style::cyan, Style::magenta, Style::yellow, Style::blue];

fn move_style(color: Option<usize>) -> Style {
    match color {
        Some(color) => COLORS[color % COLORS.len()](Style::new()),
        None => Style::new(),
    }
}

fn main() {
    let old = "The first paragraph stays where it is.\n\n\
               This paragraph is moved further down.\n\n\
               The quick brown fox jumps over the lazy dog.";
    let new = "The first paragraph stays where it is.\n\n\
               The quick brown cat jumps over the lazy dog.\n\n\
               This paragraph is moved further down.";

    let diff = MoveDiff::configure().diff(old, new).unwrap();

    for fragment in diff.fragments() {
        let style = move_style(fragment.color());
        match fragment.kind() {
            FragmentKind::Same => print!("{}", style.apply_to(fragment.text())),
            FragmentKind::Delete => print!("{}", style.red().apply_to(fragment.text())),
            FragmentKind::Insert => print!("{}", style.green().underlined().apply_to(fragment.text())),
            FragmentKind::MarkLeft | FragmentKind::MarkRight => {
                print!("{}", style.bold().apply_to(fragment.kind()))
            }
            FragmentKind::BlockLeft | FragmentKind::BlockRight | FragmentKind::BlockEnd => {
                print!("{}", style.dim().apply_to(fragment.kind()))
            }
            FragmentKind::Omission | FragmentKind::OmissionLeft | FragmentKind::OmissionRight => {
                print!("{}", Style::new().dim().apply_to(fragment.kind()))
            }
            FragmentKind::Separator => println!("\n{}", Style::new().dim().apply_to("...")),
            FragmentKind::FragmentStart
            | FragmentKind::FragmentEnd
            | FragmentKind::ContainerStart
            | FragmentKind::ContainerEnd => {}
        }
    }
    println!();
}
