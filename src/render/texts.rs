//! Localized string tables
//!
//! Placeholders use `{name}` syntax and are substituted by [`fill`].

use crate::models::Language;

pub struct Texts {
    pub welcome: &'static str,
    pub token_prompt: &'static str,
    pub token_accepted: &'static str,
    pub token_rejected: &'static str,
    pub token_unverified: &'static str,
    pub auth_required: &'static str,
    pub accounts_header: &'static str,
    pub credit_limit: &'static str,
    pub select_numeric: &'static str,
    pub select_buttons: &'static str,
    pub no_accounts: &'static str,
    pub selection_not_number: &'static str,
    pub selection_out_of_range: &'static str,
    pub use_buttons: &'static str,
    pub stale_selection: &'static str,
    pub days_prompt: &'static str,
    pub days_invalid: &'static str,
    pub statement_header: &'static str,
    pub income: &'static str,
    pub expenses: &'static str,
    pub no_transactions: &'static str,
    pub upstream_error: &'static str,
    pub rate_limited: &'static str,
    pub cancelled: &'static str,
    pub unknown_command: &'static str,
    pub help: &'static str,
    pub digest_header: &'static str,
    pub account: &'static str,
}

const EN: Texts = Texts {
    welcome: "👋 Hi! I can show your Monobank balances and statements.\nChoose your language:",
    token_prompt: "Send me your Monobank personal API token.\nYou can get it at https://api.monobank.ua/",
    token_accepted: "✅ Token accepted, {name}. Accounts available: {count}.\nSend /account_info to see them.",
    token_rejected: "❌ The bank rejected this token. Send /start to try again.",
    token_unverified: "❌ The token could not be checked and was not saved ({detail}). Send /start to try again.",
    auth_required: "🔒 Please link your account first: send /start.",
    accounts_header: "Your accounts:",
    credit_limit: "credit limit",
    select_numeric: "Reply with the account number (1–{max}).",
    select_buttons: "Choose an account:",
    no_accounts: "No accounts are linked to this token.",
    selection_not_number: "Please send the account number as digits.",
    selection_out_of_range: "There is no account number {index}. Choose between 1 and {max}.",
    use_buttons: "Please choose an account with the buttons under the list.",
    stale_selection: "This account list is outdated. Send /account_info to get a fresh one.",
    days_prompt: "Account {account} selected.\nFor how many days do you want the statement? Send a number from 1 to 31.",
    days_invalid: "The number of days must be a whole number from 1 to 31.",
    statement_header: "📄 Statement for {account}, last {days} days:",
    income: "Income",
    expenses: "Expenses",
    no_transactions: "No transactions on {account} in the last {days} days.",
    upstream_error: "⚠️ The bank returned an error: {detail}",
    rate_limited: "⏳ The bank limits how often data can be requested. Try again in a minute. ({detail})",
    cancelled: "Cancelled. Send /account_info or /start to begin again.",
    unknown_command: "Sorry, I don't understand. Send /help for the list of commands.",
    help: "/start – link your Monobank token\n/account_info – balances and statements\n/cancel – stop the current dialogue\n/help – this message",
    digest_header: "🗓 Daily digest for {name}",
    account: "account",
};

const UK: Texts = Texts {
    welcome: "👋 Вітаю! Я покажу баланси та виписки з вашого Monobank.\nОберіть мову:",
    token_prompt: "Надішліть мені ваш персональний токен Monobank API.\nОтримати його можна на https://api.monobank.ua/",
    token_accepted: "✅ Токен прийнято, {name}. Доступно рахунків: {count}.\nНадішліть /account_info, щоб їх переглянути.",
    token_rejected: "❌ Банк відхилив цей токен. Надішліть /start, щоб спробувати ще раз.",
    token_unverified: "❌ Не вдалося перевірити токен, його не збережено ({detail}). Надішліть /start, щоб спробувати ще раз.",
    auth_required: "🔒 Спершу підключіть рахунок: надішліть /start.",
    accounts_header: "Ваші рахунки:",
    credit_limit: "кредитний ліміт",
    select_numeric: "Надішліть номер рахунку (1–{max}).",
    select_buttons: "Оберіть рахунок:",
    no_accounts: "До цього токена не прив'язано жодного рахунку.",
    selection_not_number: "Надішліть номер рахунку цифрами.",
    selection_out_of_range: "Рахунку з номером {index} немає. Оберіть від 1 до {max}.",
    use_buttons: "Оберіть рахунок кнопками під списком.",
    stale_selection: "Цей список рахунків застарів. Надішліть /account_info, щоб отримати новий.",
    days_prompt: "Обрано рахунок {account}.\nЗа скільки днів показати виписку? Надішліть число від 1 до 31.",
    days_invalid: "Кількість днів має бути цілим числом від 1 до 31.",
    statement_header: "📄 Виписка по {account} за останні {days} дн.:",
    income: "Надходження",
    expenses: "Витрати",
    no_transactions: "Немає операцій по {account} за останні {days} дн.",
    upstream_error: "⚠️ Банк повернув помилку: {detail}",
    rate_limited: "⏳ Банк обмежує частоту запитів. Спробуйте за хвилину. ({detail})",
    cancelled: "Скасовано. Надішліть /account_info або /start, щоб почати знову.",
    unknown_command: "Вибачте, я не розумію. Надішліть /help, щоб побачити список команд.",
    help: "/start – підключити токен Monobank\n/account_info – баланси та виписки\n/cancel – зупинити поточний діалог\n/help – це повідомлення",
    digest_header: "🗓 Щоденний підсумок для {name}",
    account: "рахунок",
};

pub fn texts(lang: Language) -> &'static Texts {
    match lang {
        Language::English => &EN,
        Language::Ukrainian => &UK,
    }
}

/// Substitute `{key}` placeholders.
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}
