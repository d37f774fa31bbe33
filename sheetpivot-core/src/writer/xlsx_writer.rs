// ! XLSX package writer for pivot tables

use crate::error::{ConvertError, Result};
use crate::pivot::PivotTable;
use crate::reader::CellValue;
use crate::writer::WriterOptions;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{self, Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// Indices into `cellXfs` of STYLES_XML
const STYLE_HEADER: u32 = 1;
const STYLE_HEADER_KEY: u32 = 2;
const STYLE_KEY: u32 = 3;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// cellXfs: 0 default, 1 bold centered header, 2 bold left header (A1), 3 left (column A)
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2">
<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>
</fonts>
<fills count="2">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
</fills>
<borders count="1">
<border><left/><right/><top/><bottom/><diagonal/></border>
</borders>
<cellStyleXfs count="1">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
</cellStyleXfs>
<cellXfs count="4">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="center"/></xf>
<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="left"/></xf>
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment horizontal="left"/></xf>
</cellXfs>
<cellStyles count="1">
<cellStyle name="Normal" xfId="0" builtinId="0"/>
</cellStyles>
</styleSheet>"#;

/// Zero-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row + 1)
    }

    /// Convert column number to letter (0 -> A, 1 -> B, etc.)
    fn col_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// Write a complete single-sheet XLSX package for `table` into `out`
pub fn write_package<W: Write + Seek>(
    table: &PivotTable,
    options: &WriterOptions,
    out: W,
) -> Result<()> {
    let workbook_xml = workbook_xml(&options.sheet_name)
        .map_err(|e| ConvertError::io("xl/workbook.xml", e))?;
    let sheet_xml = sheet_xml(table, &options.corner_label)
        .map_err(|e| ConvertError::io("xl/worksheets/sheet1.xml", e))?;

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook_xml.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet_xml.as_slice()),
    ];

    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content).map_err(|e| ConvertError::io(name, e))?;
    }
    zip.finish()?;
    Ok(())
}

fn xml_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

fn new_writer() -> io::Result<Writer<Cursor<Vec<u8>>>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;
    Ok(writer)
}

fn start<W: Write>(writer: &mut Writer<W>, element: BytesStart<'_>) -> io::Result<()> {
    writer.write_event(Event::Start(element)).map_err(xml_err)
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> io::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
}

fn text_element<W: Write>(writer: &mut Writer<W>, element: BytesStart<'_>, text: &str) -> io::Result<()> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    start(writer, element)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    end(writer, &name)
}

fn workbook_xml(sheet_name: &str) -> io::Result<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("workbook");
    root.push_attribute(("xmlns", MAIN_NS));
    root.push_attribute(("xmlns:r", REL_NS));
    start(&mut writer, root)?;
    start(&mut writer, BytesStart::new("sheets"))?;

    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", sheet_name));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    writer.write_event(Event::Empty(sheet)).map_err(xml_err)?;

    end(&mut writer, "sheets")?;
    end(&mut writer, "workbook")?;
    Ok(writer.into_inner().into_inner())
}

fn sheet_xml(table: &PivotTable, corner_label: &str) -> io::Result<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", MAIN_NS));
    start(&mut writer, root)?;
    start(&mut writer, BytesStart::new("sheetData"))?;

    // Header: bold and centered, except A1 which takes the key column's left alignment
    let corner = CellValue::Text(corner_label.to_string());
    let method_headers: Vec<CellValue> = table.methods.iter().map(CellValue::from).collect();
    let header = std::iter::once((&corner, STYLE_HEADER_KEY))
        .chain(method_headers.iter().map(|h| (h, STYLE_HEADER)));
    write_row(&mut writer, 0, header)?;

    for (i, row) in table.rows.iter().enumerate() {
        let cells = std::iter::once((&row.model, STYLE_KEY))
            .chain(row.cells.iter().map(|c| (c, 0)));
        write_row(&mut writer, (i + 1) as u32, cells)?;
    }

    end(&mut writer, "sheetData")?;
    end(&mut writer, "worksheet")?;
    Ok(writer.into_inner().into_inner())
}

fn write_row<'a, W: Write>(
    writer: &mut Writer<W>,
    row: u32,
    cells: impl Iterator<Item = (&'a CellValue, u32)>,
) -> io::Result<()> {
    let mut element = BytesStart::new("row");
    element.push_attribute(("r", (row + 1).to_string().as_str()));
    start(writer, element)?;
    for (col, (value, style)) in cells.enumerate() {
        write_cell(writer, CellReference::new(row, col as u32), value, style)?;
    }
    end(writer, "row")
}

fn write_cell<W: Write>(
    writer: &mut Writer<W>,
    reference: CellReference,
    value: &CellValue,
    style: u32,
) -> io::Result<()> {
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", reference.to_excel_ref().as_str()));
    if style != 0 {
        cell.push_attribute(("s", style.to_string().as_str()));
    }

    // XLSX cannot hold NaN or infinity, so those render blank like missing values
    let value = match value {
        CellValue::Number(n) if !n.is_finite() => &CellValue::Empty,
        other => other,
    };

    match value {
        // Missing values stay blank; a styled blank keeps its formatting
        CellValue::Empty => {
            if style != 0 {
                writer.write_event(Event::Empty(cell)).map_err(xml_err)?;
            }
            Ok(())
        }
        CellValue::Number(n) => {
            start(writer, cell)?;
            text_element(writer, BytesStart::new("v"), &n.to_string())?;
            end(writer, "c")
        }
        CellValue::Boolean(b) => {
            cell.push_attribute(("t", "b"));
            start(writer, cell)?;
            text_element(writer, BytesStart::new("v"), if *b { "1" } else { "0" })?;
            end(writer, "c")
        }
        CellValue::Error(e) => {
            cell.push_attribute(("t", "e"));
            start(writer, cell)?;
            text_element(writer, BytesStart::new("v"), e)?;
            end(writer, "c")
        }
        CellValue::Text(_) => {
            cell.push_attribute(("t", "inlineStr"));
            start(writer, cell)?;
            start(writer, BytesStart::new("is"))?;
            let mut t = BytesStart::new("t");
            t.push_attribute(("xml:space", "preserve"));
            text_element(writer, t, &value.to_string())?;
            end(writer, "is")?;
            end(writer, "c")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::{MethodSet, PivotRow};

    fn sample_table() -> PivotTable {
        PivotTable {
            key_column: "Models".to_string(),
            methods: MethodSet::new(["Voting", "Bagging"]),
            rows: vec![PivotRow {
                model: CellValue::from("A & B"),
                cells: vec![CellValue::Number(0.9), CellValue::Empty],
            }],
        }
    }

    #[test]
    fn test_col_to_letter() {
        assert_eq!(CellReference::new(0, 0).to_excel_ref(), "A1");
        assert_eq!(CellReference::new(1, 25).to_excel_ref(), "Z2");
        assert_eq!(CellReference::new(2, 26).to_excel_ref(), "AA3");
        assert_eq!(CellReference::new(0, 701).to_excel_ref(), "ZZ1");
    }

    #[test]
    fn test_sheet_xml_styles_and_blanks() {
        let xml = String::from_utf8(sheet_xml(&sample_table(), "Method").unwrap()).unwrap();

        assert!(xml.contains(r#"<c r="A1" s="2" t="inlineStr"><is><t xml:space="preserve">Method</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B1" s="1" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="C1" s="1" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="A2" s="3" t="inlineStr"><is><t xml:space="preserve">A &amp; B</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B2"><v>0.9</v></c>"#));
        // missing score is omitted, not written as NaN or null
        assert!(!xml.contains(r#"r="C2""#));
        assert!(!xml.contains("NaN"));
    }

    #[test]
    fn test_workbook_xml_escapes_sheet_name() {
        let xml = String::from_utf8(workbook_xml("R2 <wide>").unwrap()).unwrap();
        assert!(xml.contains(r#"name="R2 &lt;wide&gt;""#));
    }

    #[test]
    fn test_non_finite_numbers_are_blank() {
        let table = PivotTable {
            key_column: "Models".to_string(),
            methods: MethodSet::new(["Voting", "Bagging", "Stacking"]),
            rows: vec![PivotRow {
                model: CellValue::from("A"),
                cells: vec![
                    CellValue::Number(f64::NAN),
                    CellValue::Number(f64::INFINITY),
                    CellValue::Number(0.25),
                ],
            }],
        };
        let xml = String::from_utf8(sheet_xml(&table, "Method").unwrap()).unwrap();

        assert!(!xml.contains(r#"r="B2""#));
        assert!(!xml.contains(r#"r="C2""#));
        assert!(!xml.contains("NaN"));
        assert!(!xml.contains(">inf<"));
        assert!(xml.contains(r#"<c r="D2"><v>0.25</v></c>"#));
    }

    #[test]
    fn test_write_package_contains_all_parts() {
        let mut buf = Cursor::new(Vec::new());
        write_package(&sample_table(), &WriterOptions::default(), &mut buf).unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(buf.into_inner())).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(zip.by_name(name).is_ok(), "missing part {}", name);
        }
    }
}
