use axum_test::TestResponse;
use scraper::Html;

pub(crate) fn parse_html_document(response: &TestResponse) -> Html {
    Html::parse_document(&response.text())
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
