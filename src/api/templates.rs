//! HTML pages rendered with Handlebars. Everything interpolated is
//! HTML escaped, which matters because subjects and addresses are
//! user supplied.

use std::fmt;

use axum::response::Html;
use handlebars::Handlebars;
use serde_json::Value;

use crate::api::public::ApiError;
use crate::api::routes::SharedState;

#[derive(Debug, Clone, Copy)]
pub enum Page {
    Inbox,
    Login,
    Register,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const HEAD_PARTIAL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Mail</title>
  <link rel="stylesheet" href="/mail/styles.css">
</head>
"#;

const INBOX_PAGE: &str = r#"{{> head}}
<body>
  <h2>{{email}}</h2>
  <nav>
    <button id="inbox">Inbox</button>
    <button id="compose">Compose</button>
    <button id="sent">Sent</button>
    <button id="archived">Archived</button>
    <a href="/logout">Log Out</a>
  </nav>
  <hr>
  <div id="emails-view"></div>
  <div id="email-view"></div>
  <div id="compose-view">
    <h3>New Email</h3>
    <form id="compose-form">
      <div>From: <input disabled value="{{email}}"></div>
      <div>To: <input id="compose-recipients"></div>
      <div><input id="compose-subject" placeholder="Subject"></div>
      <textarea id="compose-body" placeholder="Body"></textarea>
      <input type="submit" value="Send">
    </form>
  </div>
  <script src="/mail/inbox.js"></script>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"{{> head}}
<body>
  <h2>Login</h2>
  {{#if message}}<div class="message">{{message}}</div>{{/if}}
  <form action="/login" method="post">
    <input autofocus type="email" name="email" placeholder="Email">
    <input type="password" name="password" placeholder="Password">
    <input type="submit" value="Login">
  </form>
  Don't have an account? <a href="/register">Register here.</a>
</body>
</html>
"#;

const REGISTER_PAGE: &str = r#"{{> head}}
<body>
  <h2>Register</h2>
  {{#if message}}<div class="message">{{message}}</div>{{/if}}
  <form action="/register" method="post">
    <input autofocus type="email" name="email" placeholder="Email">
    <input type="password" name="password" placeholder="Password">
    <input type="password" name="confirmation" placeholder="Confirm Password">
    <input type="submit" value="Register">
  </form>
  Already have an account? <a href="/login">Log In here.</a>
</body>
</html>
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_partial("head", HEAD_PARTIAL)
        .expect("Failed to register partial");
    registry
        .register_template_string(&Page::Inbox.to_string(), INBOX_PAGE)
        .expect("Failed to register template");
    registry
        .register_template_string(&Page::Login.to_string(), LOGIN_PAGE)
        .expect("Failed to register template");
    registry
        .register_template_string(&Page::Register.to_string(), REGISTER_PAGE)
        .expect("Failed to register template");
    registry
}

pub fn render(state: &SharedState, page: Page, data: &Value) -> Result<Html<String>, ApiError> {
    let html = state
        .read()
        .expect("Unable to read share state")
        .templates
        .render(&page.to_string(), data)?;
    Ok(Html(html))
}
