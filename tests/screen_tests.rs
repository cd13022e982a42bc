//! End-to-end interpreter tests
//!
//! Feed raw byte streams through the terminal and check the resulting
//! screen state, the way the relay does with real shell output.

use netterm::core::Color;
use netterm::Terminal;

fn text_of(term: &Terminal) -> String {
    term.snapshot().to_text()
}

// ============================================================================
// Printing and wrapping
// ============================================================================

#[test]
fn test_fill_screen_then_one_more_scrolls_once() {
    let rows = 4;
    let cols = 10;
    let mut term = Terminal::new(rows, cols);

    // Exactly rows * cols printable characters fill the grid with no scroll
    let fill: Vec<u8> = (0..rows * cols).map(|i| b'a' + (i % 26) as u8).collect();
    term.process(&fill);

    let snap = term.snapshot();
    assert_eq!(snap.grid[0][0].ch, 'a');
    assert_eq!(snap.grid[rows - 1][cols - 1].ch, ((b'a' + ((rows * cols - 1) % 26) as u8) as char));

    // One more character scrolls exactly one row
    term.process(b"Z");
    let snap = term.snapshot();
    assert_eq!(snap.grid[rows - 1][0].ch, 'Z');
    // The old first row is gone; row 0 now holds what was row 1
    assert_eq!(snap.grid[0][0].ch, (b'a' + cols as u8) as char);
    assert_eq!(snap.cursor.row, rows - 1);
    assert_eq!(snap.cursor.col, 1);
}

#[test]
fn test_wrap_at_right_edge() {
    let mut term = Terminal::new(4, 5);
    term.process(b"abcdef");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][4].ch, 'e');
    assert_eq!(snap.grid[1][0].ch, 'f');
}

#[test]
fn test_linefeed_at_bottom_scrolls() {
    let mut term = Terminal::new(3, 10);
    term.process(b"one\r\ntwo\r\nthree\r\nfour");
    let snap = term.snapshot();
    let text = snap.to_text();
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    assert_eq!(lines, vec!["two", "three", "four"]);
    assert_eq!(snap.cursor.row, 2);
}

// ============================================================================
// Control characters
// ============================================================================

#[test]
fn test_carriage_return_overwrites() {
    let mut term = Terminal::new(4, 20);
    term.process(b"hello\rHE");
    assert_eq!(text_of(&term).lines().next().unwrap(), "HEllo");
}

#[test]
fn test_backspace_stops_at_left_edge() {
    let mut term = Terminal::new(4, 20);
    term.process(b"ab\x08\x08\x08\x08X");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][0].ch, 'X');
    assert_eq!(snap.grid[0][1].ch, 'b');
}

#[test]
fn test_tab_advances_to_next_stop() {
    let mut term = Terminal::new(4, 80);
    term.process(b"ab\tX");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][8].ch, 'X');

    term.process(b"\tY");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][16].ch, 'Y');
}

// ============================================================================
// Escape sequences through the full pipeline
// ============================================================================

#[test]
fn test_sequence_split_across_chunks() {
    // The relay delivers bytes in arbitrary chunk sizes; a sequence split
    // anywhere must still apply as one unit
    let mut term = Terminal::new(24, 80);
    term.process(b"\x1b[5");
    term.process(b";1");
    term.process(b"0H");
    term.process(b"x");
    let snap = term.snapshot();
    assert_eq!(snap.grid[4][9].ch, 'x');
}

#[test]
fn test_malformed_sequence_dropped_silently() {
    // A non-CSI escape sequence terminates at the first alphabetic byte
    // and is dropped; surrounding text is unaffected
    let mut term = Terminal::new(24, 80);
    term.process(b"a\x1b(Bb");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][0].ch, 'a');
    assert_eq!(snap.grid[0][1].ch, 'b');
}

#[test]
fn test_esc_restarts_accumulation() {
    // A second ESC mid-sequence abandons the first accumulation
    let mut term = Terminal::new(24, 80);
    term.process(b"\x1b[31\x1b[32mx");
    assert_eq!(term.snapshot().grid[0][0].fg, Color::Green);
}

#[test]
fn test_empty_params_are_zero() {
    // ESC[;5H: empty first parameter reads as 0, clamped like an explicit 0
    let mut term = Terminal::new(24, 80);
    term.process(b"\x1b[;5Hx");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][4].ch, 'x');
}

#[test]
fn test_clear_screen_preserves_attributes() {
    // ESC[2J homes the cursor and clears cells but keeps the live
    // attribute set
    let mut term = Terminal::new(4, 10);
    term.process(b"\x1b[31mred\x1b[2Jx");
    let snap = term.snapshot();
    assert_eq!(snap.grid[0][0].ch, 'x');
    assert_eq!(snap.grid[0][0].fg, Color::Red);
    assert_eq!(snap.to_text().trim_end(), "x");
}

#[test]
fn test_erase_below_keeps_text_above() {
    let mut term = Terminal::new(4, 10);
    term.process(b"top\r\nmid\r\nbot\x1b[2;2H\x1b[0J");
    let snap = term.snapshot();
    let text = snap.to_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "top");
    assert_eq!(lines[1], "m");
    assert_eq!(lines[2], "");
}

#[test]
fn test_prompt_like_stream() {
    // The kind of stream a shell actually emits: colored prompt, command
    // echo, output line
    let mut term = Terminal::new(24, 80);
    term.process(b"\x1b[1;32mterm:$\x1b[0m ls\r\nfile_a  file_b\r\n\x1b[1;32mterm:$\x1b[0m ");
    let snap = term.snapshot();
    let text = snap.to_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "term:$ ls");
    assert_eq!(lines[1], "file_a  file_b");
    assert_eq!(lines[2], "term:$");
    assert_eq!(snap.grid[0][0].fg, Color::Green);
    assert!(snap.grid[0][0].bold);
    assert_eq!(snap.grid[0][7].fg, Color::White);
    assert_eq!(snap.cursor.row, 2);
    assert_eq!(snap.cursor.col, 7);
}
