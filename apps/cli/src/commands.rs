use anyhow::{bail, Context};

pub const USAGE: &str = "usage: recurra [overview | mark-paid <bill-id> | unmark-paid <bill-id> --yes]

Each run starts with an empty settlement record, so unmark-paid finds the
auto-payment to delete by date, amount and the \"Auto-payment\" note rather
than by the payment id recorded when the bill was marked paid.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Overview,
    MarkPaid { bill_id: String },
    /// Reverting a payment deletes the linked auto-payment, so it needs
    /// explicit confirmation.
    UnmarkPaid { bill_id: String, confirmed: bool },
}

impl Command {
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("overview") => Command::Overview,
            Some("help" | "--help" | "-h") => Command::Help,
            Some("mark-paid") => Command::MarkPaid {
                bill_id: args.next().context(USAGE)?,
            },
            Some("unmark-paid") => {
                let mut bill_id = None;
                let mut confirmed = false;
                for arg in args.by_ref() {
                    match arg.as_str() {
                        "--yes" | "-y" => confirmed = true,
                        _ if bill_id.is_none() => bill_id = Some(arg),
                        other => bail!("Unexpected argument '{}'\n{}", other, USAGE),
                    }
                }
                Command::UnmarkPaid {
                    bill_id: bill_id.context(USAGE)?,
                    confirmed,
                }
            }
            Some(other) => bail!("Unknown command '{}'\n{}", other, USAGE),
        };
        if let Some(extra) = args.next() {
            bail!("Unexpected argument '{}'\n{}", extra, USAGE);
        }
        Ok(command)
    }
}
