/*! Aligned-column table rendering for the capture tools' screens.

Two back ends share one layout engine: a cursor-addressed terminal
(curses-style, via crossterm) and plain stdout. Which one a table uses is
decided at construction; the layout — column positions, fixed widths,
alignment, the `"*"` placeholder for empty cells — is identical for both.
*/

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::{cursor, style, QueueableCommand};
use std::any::Any;
use std::io::{self, Write};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Backend {
    Curses,
    Stdout,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Align {
    Left,
    Right,
}

/// Hook converting a caller's data record into cell text for one column.
pub type DataBindFn = Box<dyn FnMut(u32, &dyn Any) -> String>;
/// Hook replacing the default cell rendering for specific columns;
/// returning `None` falls back to the default.
pub type CellPrintFn = Box<dyn FnMut(u32, &str) -> Option<String>>;

pub struct Col {
    pub id: u32,
    pub name: String,
    pub width: usize,
    color: Option<Color>,
    align: Align,
    /// Screen column this cell starts at; running sum of earlier widths
    /// plus padding.
    pos: usize,
}

pub struct Table {
    backend: Backend,
    y: u16,
    x: u16,
    width: usize,
    height: usize,
    hdr_color: Option<Color>,
    col_pad: usize,
    placeholder: String,
    cols: Vec<Col>,
    rows: usize,
    data_bind: Option<DataBindFn>,
    cell_print: Option<CellPrintFn>,
}

impl Table {
    pub fn new(backend: Backend) -> Table {
        let (width, height) = match backend {
            Backend::Curses => crossterm::terminal::size()
                .map(|(w, h)| (w as usize, (h as usize).saturating_sub(2)))
                .unwrap_or((80, 22)),
            Backend::Stdout => (80, 22),
        };
        Table {
            backend,
            y: 0,
            x: 0,
            width,
            height,
            hdr_color: None,
            col_pad: 1,
            placeholder: "*".to_string(),
            cols: Vec::new(),
            rows: 0,
            data_bind: None,
            cell_print: None,
        }
    }

    pub fn set_pos(&mut self, y: u16, x: u16) {
        self.y = y;
        self.x = x;
        self.update_positions();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    pub fn rows_count(&self) -> usize {
        self.rows
    }

    pub fn set_header_color(&mut self, color: Color) {
        self.hdr_color = Some(color);
    }

    pub fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    /// Append a column and recompute every column's render position.
    pub fn add_col(&mut self, id: u32, name: &str, width: usize) {
        self.cols.push(Col {
            id,
            name: name.to_string(),
            width,
            color: None,
            align: Align::Left,
            pos: 0,
        });
        self.update_positions();
    }

    pub fn set_col_color(&mut self, id: u32, color: Color) {
        self.col_mut(id).color = Some(color);
    }

    pub fn set_col_align(&mut self, id: u32, align: Align) {
        self.col_mut(id).align = align;
    }

    pub fn set_data_bind(&mut self, hook: DataBindFn) {
        self.data_bind = Some(hook);
    }

    pub fn set_cell_print(&mut self, hook: CellPrintFn) {
        self.cell_print = Some(hook);
    }

    /// Render a caller's data record into the given column through the
    /// installed binding hook.
    ///
    /// # Panics
    ///
    /// Binding without a hook installed is a programmer error.
    pub fn bind_data(&mut self, id: u32, data: &dyn Any) -> io::Result<()> {
        let mut hook = self.data_bind.take().expect("no data binding installed");
        let text = hook(id, data);
        self.data_bind = Some(hook);
        self.print_cell(id, &text)
    }

    /// Print the header row; under curses the whole line is painted in the
    /// header colour across the table's width.
    pub fn print_header(&mut self) -> io::Result<()> {
        let mut used = 0;
        if self.backend == Backend::Curses {
            let blank = format!("{:width$}", "", width = self.width.saturating_sub(self.x as usize));
            self.emit(self.y, self.x as usize, self.hdr_color, &blank)?;
        }
        let headers: Vec<(u32, String)> = self
            .cols
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect();
        for (id, name) in headers {
            let col = self.col(id);
            let text = format_cell(col, &name, &self.placeholder);
            let (pos, width) = (col.pos, col.width);
            let color = self.hdr_color;
            self.emit(self.y, pos, color, &text)?;
            used = pos + width + self.col_pad;
        }
        if self.backend == Backend::Curses && used < self.width {
            let blank = format!("{:width$}", "", width = self.width - used);
            self.emit(self.y, used, self.hdr_color, &blank)?;
        }
        self.newline()
    }

    /// Print one cell of the current row. Empty text renders as the
    /// placeholder; the installed cell-print hook may override the text.
    pub fn print_cell(&mut self, id: u32, text: &str) -> io::Result<()> {
        let rendered = match self.cell_print.take() {
            Some(mut hook) => {
                let r = hook(id, text);
                self.cell_print = Some(hook);
                r
            }
            None => None,
        };
        let col = self.col(id);
        let out = match rendered {
            Some(r) => r,
            None => format_cell(col, text, &self.placeholder),
        };
        let (pos, color) = (col.pos, col.color);
        let row_y = self.y + 1 + self.rows as u16;
        self.emit(row_y, pos, color, &out)
    }

    /// Finish the current row: bump the row counter, and under stdout
    /// terminate the line.
    pub fn add_row(&mut self) -> io::Result<()> {
        self.rows += 1;
        self.newline()
    }

    /// Blank every row line and reset the counter.
    pub fn clear(&mut self) -> io::Result<()> {
        self.rows = 0;
        if self.backend == Backend::Curses {
            for y in self.y + 1..self.y + self.height as u16 {
                let blank = format!("{:width$}", "", width = self.width);
                self.emit(y, self.x as usize, None, &blank)?;
            }
        }
        Ok(())
    }

    fn col(&self, id: u32) -> &Col {
        self.cols
            .iter()
            .find(|c| c.id == id)
            .expect("unknown column id")
    }

    fn col_mut(&mut self, id: u32) -> &mut Col {
        self.cols
            .iter_mut()
            .find(|c| c.id == id)
            .expect("unknown column id")
    }

    fn update_positions(&mut self) {
        let mut pos = self.x as usize;
        for col in &mut self.cols {
            col.pos = pos;
            pos += col.width + self.col_pad;
        }
    }

    fn emit(&self, y: u16, x: usize, color: Option<Color>, text: &str) -> io::Result<()> {
        match self.backend {
            Backend::Curses => {
                let mut stdout = io::stdout();
                stdout.queue(cursor::MoveTo(x as u16, y))?;
                if let Some(color) = color {
                    stdout.queue(SetForegroundColor(color))?;
                }
                stdout.queue(style::Print(text))?;
                if color.is_some() {
                    stdout.queue(ResetColor)?;
                }
                stdout.flush()
            }
            Backend::Stdout => {
                let mut stdout = io::stdout();
                write!(stdout, "{text} ")
            }
        }
    }

    fn newline(&self) -> io::Result<()> {
        if self.backend == Backend::Stdout {
            writeln!(io::stdout())
        } else {
            Ok(())
        }
    }
}

/// Fixed-width cell text: placeholder for empty input, truncated to the
/// column width, padded per alignment.
fn format_cell(col: &Col, text: &str, placeholder: &str) -> String {
    let text = if text.is_empty() { placeholder } else { text };
    match col.align {
        Align::Left => format!("{text:<width$.width$}", width = col.width),
        Align::Right => format!("{text:>width$.width$}", width = col.width),
    }
}
