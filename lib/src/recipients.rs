use crate::mail::Email;

const PAIR_SEPARATOR: char = '|';
const FIELD_SEPARATOR: char = ',';

/// Parses a `"name,email|name,email"` list into addresses.
///
/// Segments that are not exactly one `name,email` pair, or that have an
/// empty name or email, are dropped. So is any segment whose email matches
/// `mail_to` (case-insensitive), which keeps the primary recipient out of
/// the cc/bcc lists.
pub fn split_emails(mail_list: &str, mail_to: &str) -> Vec<Email> {
    if mail_list.is_empty() {
        return Vec::new();
    }

    let mail_to = mail_to.trim().to_lowercase();

    mail_list
        .split(PAIR_SEPARATOR)
        .filter_map(|name_mail| {
            let parts: Vec<&str> = name_mail.split(FIELD_SEPARATOR).map(str::trim).collect();

            match parts.as_slice() {
                [name, address] if !name.is_empty() && !address.is_empty() => {
                    if address.to_lowercase() == mail_to {
                        log::debug!("Dropping {} from copy list, already a recipient", address);
                        None
                    } else {
                        Some(Email::new(name, address))
                    }
                }
                _ => None,
            }
        })
        .collect()
}
