// src/fixtures.rs
// Trimmed-down copies of the site's pages, shared by unit tests.

use crate::error::TableSlot;

pub const LISTING_PAGE: &str = "<html><body>
<nav><a href='/recherche-entreprises/2/'>Page suivante</a></nav>
<div class='card'>
  <a class='text-uppercase font-weight-bold stretched-link' href='/entreprises/111111111-acme-industries/'>
    ACME INDUSTRIES
  </a>
</div>
<div class='card'>
  <a class='text-uppercase font-weight-bold stretched-link'>SANS LIEN</a>
</div>
<div class='card'>
  <a class='text-uppercase font-weight-bold stretched-link' href='/entreprises/222222222-sgt/'>SOCIÉTÉ GÉNÉRALE DE TEST</a>
</div>
</body></html>";

const SUMMARY_TABLE: &str = "<table class='table table-hover border-bottom m-0'>
<tr><th>Indicateur</th><th>2023</th></tr>
<tr><td>Chiffre d'affaires</td><td>2.5 M</td></tr>
<tr><td>Résultat net</td><td>150 K</td></tr>
<tr><td>Marge nette</td><td>6 %</td></tr>
<tr><td>Effectif</td><td>n.c.</td></tr>
</table>";

const RESULTS_TABLE: &str = "<table class='table border-bottom mb-0'>
<tr><th>Compte de résultat</th><th>2023</th><th>2022</th></tr>
<tr><td>Chiffre d'affaires</td><td>2.5 M<br>\n+25 %</td><td>2 M<br>\n-20 %</td></tr>
<tr><td>Résultat net</td><td>150 K<br>\n+50 %</td><td>100 K<br>\n+10 %</td></tr>
</table>";

const ASSETS_TABLE: &str = "<table class='table border-bottom mb-0'>
<tr><th>Actif</th><th>2023</th><th>2022</th></tr>
<tr><td>Actif immobilisé</td><td>1.2 M<br>\n+20 %</td><td>1 M<br>\n+25 %</td></tr>
<tr><td>Stocks</td><td>300 K<br>\n-25 %</td><td>400 K<br>\n+100 %</td></tr>
</table>";

const LIABILITIES_TABLE: &str = "<table class='table border-bottom mb-0'>
<tr><th>Passif</th><th>2023</th><th>2022</th></tr>
<tr><td>Capitaux propres</td><td>900 K<br>\n+12.5 %</td><td>800 K<br>\n+60 %</td></tr>
<tr><td>Dettes</td><td>600 K<br>\n0 %</td><td></td></tr>
</table>";

fn table_html(slot: TableSlot) -> &'static str {
    match slot {
        TableSlot::Summary => SUMMARY_TABLE,
        TableSlot::Results => RESULTS_TABLE,
        TableSlot::Assets => ASSETS_TABLE,
        TableSlot::Liabilities => LIABILITIES_TABLE,
    }
}

fn page(slots: impl Iterator<Item = TableSlot>) -> String {
    let mut html = String::from(
        "<html><body><header><h1>ACME INDUSTRIES</h1></header>\n<div class='row'><p>SIREN 111111111</p></div>\n",
    );
    for slot in slots {
        html.push_str("<section>\n");
        html.push_str(table_html(slot));
        html.push_str("\n</section>\n");
    }
    html.push_str("</body></html>");
    html
}

pub fn detail_page() -> String {
    page(TableSlot::ALL.into_iter())
}

pub fn detail_page_without(missing: TableSlot) -> String {
    page(TableSlot::ALL.into_iter().filter(|s| *s != missing))
}
