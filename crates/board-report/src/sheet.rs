//! A minimal in-memory worksheet model and its xlsx rendering.

use std::collections::BTreeMap;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::Result;

/// Zero-based row index.
pub type Row = u32;
/// Zero-based column index.
pub type Col = u16;

/// Visual role of a cell. Rendering maps each to one xlsx [`Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
  Plain,
  Centered,
  Title,
  Header,
  SaturdayHeader,
  SundayHeader,
  Saturday,
  Sunday,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
  Text(String),
  Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
  pub value: CellValue,
  pub style: CellStyle,
}

/// A single-row merged range holding one text value.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
  pub row:       Row,
  pub first_col: Col,
  pub last_col:  Col,
  pub text:      String,
  pub style:     CellStyle,
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
  name:   String,
  cells:  BTreeMap<(Row, Col), Cell>,
  merges: Vec<Merge>,
  widths: Vec<(Col, f64)>,
}

impl Sheet {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn text(&mut self, row: Row, col: Col, text: impl Into<String>, style: CellStyle) {
    let value = CellValue::Text(text.into());
    self.cells.insert((row, col), Cell { value, style });
  }

  pub fn number(&mut self, row: Row, col: Col, value: f64, style: CellStyle) {
    self.cells.insert((row, col), Cell { value: CellValue::Number(value), style });
  }

  pub fn merge(
    &mut self,
    row: Row,
    first_col: Col,
    last_col: Col,
    text: impl Into<String>,
    style: CellStyle,
  ) {
    self.merges.push(Merge { row, first_col, last_col, text: text.into(), style });
  }

  pub fn set_width(&mut self, col: Col, width: f64) { self.widths.push((col, width)); }

  pub fn cell(&self, row: Row, col: Col) -> Option<&Cell> { self.cells.get(&(row, col)) }

  /// Text at `(row, col)`, including the anchor cell of a merged range.
  pub fn text_at(&self, row: Row, col: Col) -> Option<&str> {
    if let Some(merge) = self.merges.iter().find(|m| m.row == row && m.first_col == col) {
      return Some(&merge.text);
    }
    match &self.cell(row, col)?.value {
      CellValue::Text(s) => Some(s),
      CellValue::Number(_) => None,
    }
  }

  pub fn merges(&self) -> &[Merge] { &self.merges }

  pub fn to_xlsx(&self) -> Result<Vec<u8>> { workbook_bytes(std::slice::from_ref(self)) }
}

fn format(style: CellStyle) -> Format {
  match style {
    CellStyle::Plain => Format::new(),
    CellStyle::Centered => Format::new().set_align(FormatAlign::Center),
    CellStyle::Title => Format::new()
      .set_bold()
      .set_font_size(14)
      .set_align(FormatAlign::Center),
    CellStyle::Header => Format::new()
      .set_bold()
      .set_align(FormatAlign::Center)
      .set_border(FormatBorder::Thin),
    CellStyle::SaturdayHeader => format(CellStyle::Header).set_font_color(Color::Blue),
    CellStyle::SundayHeader => format(CellStyle::Header).set_font_color(Color::Red),
    CellStyle::Saturday => format(CellStyle::Centered).set_font_color(Color::Blue),
    CellStyle::Sunday => format(CellStyle::Centered).set_font_color(Color::Red),
  }
}

/// Render `sheets`, in order, into one xlsx workbook.
pub fn workbook_bytes(sheets: &[Sheet]) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  for sheet in sheets {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name.as_str())?;

    for &(col, width) in &sheet.widths {
      worksheet.set_column_width(col, width)?;
    }
    for m in &sheet.merges {
      worksheet.merge_range(m.row, m.first_col, m.row, m.last_col, &m.text, &format(m.style))?;
    }
    for (&(row, col), cell) in &sheet.cells {
      let fmt = format(cell.style);
      match &cell.value {
        CellValue::Text(s) => {
          worksheet.write_string_with_format(row, col, s, &fmt)?;
        }
        CellValue::Number(n) => {
          worksheet.write_number_with_format(row, col, *n, &fmt)?;
        }
      }
    }
  }
  Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_at_sees_merges_and_cells() {
    let mut sheet = Sheet::new("s");
    sheet.merge(0, 0, 5, "title", CellStyle::Title);
    sheet.text(1, 2, "x", CellStyle::Plain);
    sheet.number(1, 3, 2.5, CellStyle::Plain);

    assert_eq!(sheet.text_at(0, 0), Some("title"));
    assert_eq!(sheet.text_at(1, 2), Some("x"));
    assert_eq!(sheet.text_at(1, 3), None);
    assert_eq!(sheet.cell(1, 3).map(|c| &c.value), Some(&CellValue::Number(2.5)));
  }

  #[test]
  fn renders_a_zip_container() {
    let mut sheet = Sheet::new("s");
    sheet.text(0, 0, "hello", CellStyle::Header);
    let bytes = sheet.to_xlsx().unwrap();
    assert_eq!(&bytes[..2], b"PK");
  }
}
