//! Common regex patterns for foodservice invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number: "INVOICE #: 447799", "INV NO. 52241", "INVOICE 123456"
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\binv(?:oice)?\.?\s*(?:no|num|number)?\.?\s*[:#]?\s*([A-Za-z]*\d[A-Za-z0-9\-]*)"
    ).unwrap();

    // Order number: "ORDER #758-441", "P.O. NUMBER: 4417", "PO# 884512"
    pub static ref ORDER_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:(?:purchase\s+)?order|p\.?\s*o\.?)\s*(?:no|num|number)?\.?\s*[:#]?\s*([A-Za-z]*\d[A-Za-z0-9\-]*)"
    ).unwrap();

    // US date order: MM/DD/YYYY or MM-DD-YY
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // Written month: "October 2, 2024" or "Mar 3 2024"
    pub static ref DATE_WRITTEN: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})"
    ).unwrap();

    // Labeled dates
    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(?i)(?:invoice\s+date|date\s+of\s+invoice|bill(?:ing)?\s+date)[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    pub static ref DELIVERY_DATE: Regex = Regex::new(
        r"(?i)(?:delivery\s+date|date\s+(?:of\s+)?delivery|delivered(?:\s+on)?|ship\s+date)[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    // Amount patterns (US format: 1,234.56, optional $)
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})\b"
    ).unwrap();

    // Summary amounts, in rule order: specific labels before the bare TOTAL line
    pub static ref SUBTOTAL: Regex = Regex::new(
        r"(?i)\bsub[\s\-]?total\b[\s:.]*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})"
    ).unwrap();

    pub static ref TAX: Regex = Regex::new(
        r"(?i)(?:sales\s+tax|tax)\b[\s:.]*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_LABELED: Regex = Regex::new(
        r"(?i)\binvoice\s+total\b[\s:.]*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_DUE: Regex = Regex::new(
        r"(?i)\b(?:total\s+due|amount\s+due|balance\s+due|total\s+invoice)\b[\s:.]*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_LINE: Regex = Regex::new(
        r"(?im)^\s*total\b[\s:.]*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})"
    ).unwrap();

    // Line-item table boundaries
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)\b(?:item|code)\b.{0,40}\bdesc(?:ription)?\b|\bqty\b.{0,60}\b(?:price|amount|total)\b|\bdescription\b.{0,40}\b(?:qty|quantity|price)\b"
    ).unwrap();

    pub static ref SUMMARY_BREAK: Regex = Regex::new(
        r"(?i)^\s*(?:sub[\s\-]?total|total|sales\s+tax|tax|amount\s+due|balance(?:\s+due)?|invoice\s+total)\b"
    ).unwrap();

    // Whole-token shapes used by the row scanner
    pub static ref MONEY_TOKEN: Regex = Regex::new(
        r"^\$?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}$"
    ).unwrap();

    pub static ref QUANTITY_TOKEN: Regex = Regex::new(
        r"^\d+(?:\.\d+)?$"
    ).unwrap();

    pub static ref ITEM_CODE_TOKEN: Regex = Regex::new(
        r"^[A-Za-z0-9\-/]*\d[A-Za-z0-9\-/]*$"
    ).unwrap();

    // Looks like a pack token even if it does not normalize: slashed counts,
    // can codes, digit-with-unit suffixes. Plain bare numbers do not count.
    pub static ref PACK_SHAPED: Regex = Regex::new(
        r"^(?:\d+(?:\.\d+)?\s*/\s*\S+|#\S+|\d+(?:\.\d+)?[A-Za-z#]+\.?)$"
    ).unwrap();
}
