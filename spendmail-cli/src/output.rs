use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use spendmail_core::{Currency, Subscription, SubscriptionSummary, Transaction};
use spendmail_finance::MonthlySpend;
use spendmail_ingest::Analysis;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Csv,
}

/// The summary is nested, so it has no CSV form
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Table,
    Json,
}

fn money(amount: f64, currency: Currency) -> String {
    format!("{}{:.2}", currency.symbol(), amount)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{s}");
    Ok(())
}

pub fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in rows {
        wtr.serialize(t).context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

pub fn print_transactions(txns: &[Transaction], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(txns),
        Format::Csv => write_csv(io::stdout().lock(), txns),
        Format::Table => {
            for t in txns {
                println!(
                    "{} | {:>13} | {} | {}",
                    t.date.format("%Y-%m-%d %H:%M"),
                    money(t.amount, t.currency),
                    t.description,
                    t.id
                );
            }
            let total: f64 = txns.iter().map(|t| t.amount).sum();
            println!("\nDebits: {} (total {:.2})", txns.len(), total);
            Ok(())
        }
    }
}

/// Flat view of one analyzed message, including the ones the debit filter drops
#[derive(Debug, Serialize)]
pub struct AnalysisRow<'a> {
    pub id: &'a str,
    pub sent_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: Option<&'static str>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub description: Option<&'a str>,
    /// Cascade rule that produced the description
    pub rule: Option<&'static str>,
    pub subject: &'a str,
}

impl<'a> From<&'a Analysis> for AnalysisRow<'a> {
    fn from(a: &'a Analysis) -> Self {
        Self {
            id: &a.message_id,
            sent_at: a.sent_at,
            kind: a.classification.as_ref().map(|c| c.kind.as_str()),
            amount: a.amount.map(|m| m.amount),
            currency: a.amount.map(|m| m.currency),
            description: a.classification.as_ref().map(|c| c.description.text.as_str()),
            rule: a.classification.as_ref().and_then(|c| c.description.rule),
            subject: &a.subject,
        }
    }
}

pub fn print_analyses(analyses: &[Analysis], format: Format) -> Result<()> {
    let rows: Vec<AnalysisRow<'_>> = analyses.iter().map(AnalysisRow::from).collect();
    match format {
        Format::Json => print_json(&rows),
        Format::Csv => write_csv(io::stdout().lock(), &rows),
        Format::Table => {
            for row in &rows {
                let amount = row
                    .amount
                    .zip(row.currency)
                    .map(|(amount, currency)| money(amount, currency))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} | {:<7} | {:>13} | {} | {} | {}",
                    row.sent_at.format("%Y-%m-%d %H:%M"),
                    row.kind.unwrap_or("-"),
                    amount,
                    row.description.unwrap_or("-"),
                    row.subject,
                    row.id
                );
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
pub struct SummaryReport<'a> {
    pub subscriptions: &'a [Subscription],
    pub summary: SubscriptionSummary,
    pub monthly_spend: &'a [MonthlySpend],
}

pub fn print_summary(report: &SummaryReport<'_>, format: SummaryFormat) -> Result<()> {
    if format == SummaryFormat::Json {
        return print_json(report);
    }

    println!("## Subscriptions\n");
    if report.subscriptions.is_empty() {
        println!("(none detected)");
    }
    for s in report.subscriptions {
        println!(
            "- {} | {} | {} | last charged {}",
            s.name,
            money(s.amount, s.currency),
            s.interval.as_str(),
            s.last_charged.format("%Y-%m-%d")
        );
    }

    let sum = &report.summary;
    println!("\n## Summary\n");
    println!("Monthly total:             {:.2}", sum.monthly_total);
    println!("Yearly total:              {:.2}", sum.yearly_total);
    println!("Yearly as monthly:         {:.2}", sum.yearly_monthly_equivalent);
    println!("Total monthly:             {:.2}", sum.total_monthly);

    println!("\n## Monthly spend\n");
    for m in report.monthly_spend {
        println!("- {} | {:.2} across {} debits", m.month, m.total, m.count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use spendmail_ingest::{Extractor, MessagePart, NullSink, RawMessage};
    use std::sync::Arc;

    #[test]
    fn test_csv_has_wire_columns() {
        let date = Utc.with_ymd_and_hms(2024, 5, 12, 4, 30, 0).unwrap();
        let txns = vec![Transaction::debit("m1", 500.0, Currency::Inr, "AMAZON", date)];
        let mut buf = Vec::new();
        write_csv(&mut buf, &txns).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("id,type,amount,currency,description,date"));
        assert_eq!(lines.next(), Some("m1,debit,500.0,INR,AMAZON,2024-05-12T04:30:00Z"));
    }

    #[test]
    fn test_analysis_rows_keep_dropped_messages() {
        let credit = RawMessage::new(
            "c1",
            MessagePart::leaf("text/plain", "UnMuNTAwIGNyZWRpdGVkIHRvIHlvdXIgYS9j"),
        );
        let otp = RawMessage::new("o1", MessagePart::leaf("text/plain", "WW91ciBPVFAgaXMgMTIzNDU2"));
        let now = Utc.with_ymd_and_hms(2024, 5, 12, 4, 30, 0).unwrap();
        let extractor = Extractor::new(Arc::new(NullSink));
        let analyses: Vec<_> = [credit, otp]
            .iter()
            .map(|m| extractor.analyze(m, now).unwrap())
            .collect();
        let rows: Vec<_> = analyses.iter().map(AnalysisRow::from).collect();

        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("id,sent_at,type,amount,currency,description,rule,subject")
        );
        assert_eq!(
            lines.next(),
            Some("c1,2024-05-12T04:30:00Z,credit,500.0,INR,Bank Transaction,,[No Subject]")
        );
        assert_eq!(lines.next(), Some("o1,2024-05-12T04:30:00Z,,,,,,[No Subject]"));
    }

    #[test]
    fn test_money_uses_currency_symbol() {
        assert_eq!(money(1299.0, Currency::Inr), "₹1299.00");
        assert_eq!(money(12.5, Currency::Usd), "$12.50");
    }
}
