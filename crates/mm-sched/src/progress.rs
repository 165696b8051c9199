/// Render a `[----> ]  NN%` style progress bar (grounded on the original
/// `ThreadPool::printProgress`). `total == 0` renders nothing, matching a
/// build with no dirty rules.
pub fn render_progress_bar(done: usize, total: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let amount = done * 100 / total;
    let filled = amount / 4;

    let mut bar = String::from("[");
    for _ in 0..filled {
        bar.push('-');
    }
    bar.push(if amount < 100 { '>' } else { '-' });
    for _ in filled..(100 / 4) {
        bar.push(' ');
    }
    bar.push_str(&format!("] {amount}%  \r"));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_build_renders_nothing() {
        assert_eq!(render_progress_bar(0, 0), "");
    }

    #[test]
    fn halfway_shows_fifty_percent() {
        let bar = render_progress_bar(5, 10);
        assert!(bar.contains("50%"));
    }

    #[test]
    fn completed_build_caps_the_bar() {
        let bar = render_progress_bar(10, 10);
        assert!(bar.contains("100%"));
        assert!(bar.trim_end().ends_with('-'));
    }
}
