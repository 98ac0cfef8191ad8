//! form-state demo shell
//!
//! Drives a sign-up form from stdin, one event per line, and prints the
//! resulting form state.

use anyhow::{anyhow, bail, Result};
use form_state::{
    get_form_context, set_form_context, Event, FormBuilder, FormConfig, FormContext,
    InputKind, InputTarget, Rule, Rules, Scope, SubmitEvent, Value,
};
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_state=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = FormConfig::load()?;

    // Debounced validation runs as local tasks
    LocalSet::new().run_until(run_shell(config)).await
}

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Input { field: String, value: String },
    Blur { field: String },
    Check { field: String, checked: bool },
    Change { field: String, value: String },
    Submit,
    Reset,
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let (field, value) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
        let field = field.to_string();
        let need_field = |cmd: &str| -> Result<()> {
            if field.is_empty() {
                bail!("usage: {cmd} <field> ...");
            }
            Ok(())
        };

        let command = match verb {
            "input" => {
                need_field("input")?;
                Command::Input {
                    field,
                    value: value.to_string(),
                }
            }
            "blur" => {
                need_field("blur")?;
                Command::Blur { field }
            }
            "check" => {
                need_field("check")?;
                let checked = match value.trim() {
                    "" | "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    other => bail!("expected on/off, got `{other}`"),
                };
                Command::Check { field, checked }
            }
            "change" => {
                need_field("change")?;
                Command::Change {
                    field,
                    value: value.to_string(),
                }
            }
            "submit" => Command::Submit,
            "reset" => Command::Reset,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{other}`, try `help`"),
        };
        Ok(Some(command))
    }
}

fn signup_form(config: FormConfig) -> Result<FormContext> {
    let initial = Value::from(serde_json::json!({
        "email": "",
        "password": "",
        "terms": false,
        "address": {"city": ""}
    }));
    let rules = Rules::new()
        .rule("email", Rule::Required, "Email is required")
        .rule("email", Rule::Email, "Email is invalid")
        .rule("password", Rule::Required, "Password is required")
        .rule("password", Rule::MinLen(8), "Password must be at least 8 characters")
        .rule("terms", Rule::Checked, "You must accept the terms")
        .rule("address.city", Rule::Required, "City is required");

    let form = FormBuilder::new(initial)
        .config(config)
        .validator(rules)
        .on_submit(|values| println!("Submitted: {values}"))
        .build()?;
    Ok(form)
}

fn print_state(form: &FormContext) -> Result<()> {
    let state = serde_json::json!({
        "values": form.values().get(),
        "touched": form.touched().get(),
        "errors": form.errors().get(),
        "isDirty": form.is_dirty().get(),
        "isValid": form.is_valid().get(),
        "submitCount": form.submit_count().get(),
    });
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  input <field> <value>    type into a text field");
    println!("  blur <field>             leave a field");
    println!("  check <field> [on|off]   toggle a checkbox");
    println!("  change <field> <value>   commit a select/radio value");
    println!("  submit | reset | show | help | quit");
}

async fn run_shell(config: FormConfig) -> Result<()> {
    let root = Scope::root();
    set_form_context(&root, signup_form(config)?);

    // Field components look the form up from their own scope
    let field_scope = root.child();
    let form = get_form_context(&field_scope).ok_or_else(|| anyhow!("No form in scope"))?;

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };

        match command {
            Command::Input { field, value } => {
                form.handle_input(&Event::new(InputTarget::text(&field, &value)))
            }
            Command::Blur { field } => {
                let value = form
                    .field_value(&field)
                    .map(|v| v.display_value())
                    .unwrap_or_default();
                form.handle_blur(&Event::new(InputTarget::text(&field, &value)))
            }
            Command::Check { field, checked } => {
                form.handle_checked(&Event::new(InputTarget::checkbox(&field, checked)))
            }
            Command::Change { field, value } => form.handle_change(&Event::new(
                InputTarget::with_kind(&field, InputKind::Select, &value),
            )),
            Command::Submit => {
                let outcome = form.handle_submit(&SubmitEvent::new());
                println!("Submit: {outcome:?}");
            }
            Command::Reset => form.reset(),
            Command::Show => print_state(&form)?,
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    Ok(())
}
