use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::scan::{ScanReport, ScanResult, ScannedCompany};

/// Writes the whole report in one transaction. Returns the number of
/// company findings stored.
pub async fn insert_scan_report(pool: &PgPool, report: &ScanReport) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        insert into scan_run
            (scan_id, started_at, finished_at, signal_count)
        values
            ($1, $2, $3, $4)
        "#,
    )
    .bind(report.scan_id)
    .bind(report.started_at)
    .bind(report.finished_at)
    .bind(report.signal_count() as i64)
    .execute(&mut *tx)
    .await?;

    let mut findings = 0;
    for (position, result) in report.results.iter().enumerate() {
        insert_code_result(&mut *tx, report.scan_id, position as i32, result).await?;

        for company in result.distressed() {
            findings += insert_company_finding(&mut *tx, report.scan_id, &result.code, company).await?;
        }
    }

    tx.commit().await?;

    Ok(findings)
}

async fn insert_code_result(
    con: &mut PgConnection,
    scan_id: Uuid,
    position: i32,
    result: &ScanResult,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        insert into scan_code_result
            (scan_id, sic_code, position, total_matches, companies_returned)
        values
            ($1, $2, $3, $4, $5)
        on conflict do nothing
        "#,
    )
    .bind(scan_id)
    .bind(&result.code)
    .bind(position)
    .bind(result.total_matches as i64)
    .bind(result.companies.len() as i32)
    .execute(con)
    .await?;

    Ok(())
}

async fn insert_company_finding(
    con: &mut PgConnection,
    scan_id: Uuid,
    sic_code: &str,
    company: &ScannedCompany,
) -> Result<u64, sqlx::Error> {
    let profile = company.profile.as_ref();
    let company_name = profile
        .and_then(|p| p.company_name.clone())
        .or_else(|| company.summary.company_name.clone());
    let company_status = profile
        .and_then(|p| p.company_status.clone())
        .or_else(|| company.summary.company_status.clone());
    let signals: Vec<String> = company
        .finding
        .labels()
        .into_iter()
        .map(String::from)
        .collect();

    let res = sqlx::query(
        r#"
        insert into company_finding
            (scan_id, sic_code, company_number, company_name, company_status, relevant, signals)
        values
            ($1, $2, $3, $4, $5, $6, $7)
        on conflict do nothing
        "#,
    )
    .bind(scan_id)
    .bind(sic_code)
    .bind(&company.summary.company_number)
    .bind(company_name)
    .bind(company_status)
    .bind(company.relevant)
    .bind(signals)
    .execute(con)
    .await?;

    Ok(res.rows_affected())
}
