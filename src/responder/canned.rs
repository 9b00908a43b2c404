//! Keyword-matched canned replies used when no upstream model answers

use std::sync::LazyLock;

use regex::Regex;

use crate::locale::Locale;

/// One keyword rule: any keyword occurring in the message selects the reply
struct CannedRule {
    locale: Locale,
    keywords: &'static [&'static str],
    reply: &'static str,
}

const RULES: &[CannedRule] = &[
    CannedRule {
        locale: Locale::En,
        keywords: &["fever", "temperature"],
        reply: "If you have a fever, rest and stay hydrated. If fever is very high or \
                persistent, please consult a doctor. I am not a doctor \u{2014} this is general \
                information.",
    },
    CannedRule {
        locale: Locale::En,
        keywords: &["pain", "ache", "hurt"],
        reply: "For acute or severe pain seek medical attention. Tell me more about the \
                symptoms and duration and I can provide general information.",
    },
    CannedRule {
        locale: Locale::Bn,
        keywords: &["জ্বর", "জ্বর আছে", "জ্বরটা"],
        reply: "জ্বর থাকলে পর্যাপ্ত বিশ্রাম ও তরল পান করুন। তীব্র বা দীর্ঘস্থায়ী জ্বর হলে \
                নিকটস্থ চিকিৎসকের পরামর্শ নিন। আমি ডাক্তার নই, তাই এটি একটি সাধারণ পরামর্শ।",
    },
    CannedRule {
        locale: Locale::Bn,
        keywords: &["বিরক্তি", "ব্যথা", "পেইন", "ব্যথা আছে"],
        reply: "যে কোনো হঠাৎ তীব্র ব্যথা বা শ্বাসপ্রশ্বাসে সমস্যা হলে জরুরি চিকিৎসা নিন। \
                লক্ষণগুলো বললে আমি আরও সাধারণ তথ্য দিতে পারি।",
    },
];

const DEFAULT_EN: &str = "I can provide general medical information and guidance, but I am \
                          not a doctor. Please tell me your symptoms in more detail, or \
                          consult a healthcare professional for medical advice.";

const DEFAULT_BN: &str = "আমি সাধারণ স্বাস্থ্য তথ্য দিতে পারি, কিন্তু আমি ডাক্তার নই। দয়া করে \
                          স্পষ্ট লক্ষণ ও প্রয়োজনীয় তথ্য বলুন, এবং যদি জরুরি থাকে তাহলে \
                          নিকটস্থ চিকিৎসকের সঙ্গে যোগাযোগ করুন।";

/// Rules compiled to case-insensitive alternations, in table order
static COMPILED: LazyLock<Vec<(Locale, Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|rule| {
            let alternation = rule
                .keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&format!("(?i)(?:{alternation})")) {
                Ok(pattern) => Some((rule.locale, pattern, rule.reply)),
                Err(e) => {
                    tracing::warn!(error = %e, "invalid canned keyword rule, skipping");
                    None
                }
            }
        })
        .collect()
});

/// Pick the canned reply for `message` in `locale`
///
/// The first rule of the locale with a keyword occurring anywhere in the
/// message wins; otherwise the locale's generic reply is returned.
#[must_use]
pub fn canned_reply(message: &str, locale: Locale) -> &'static str {
    COMPILED
        .iter()
        .filter(|(rule_locale, _, _)| *rule_locale == locale)
        .find(|(_, pattern, _)| pattern.is_match(message))
        .map_or_else(|| default_reply(locale), |(_, _, reply)| *reply)
}

/// Generic reply when no keyword matches
#[must_use]
pub const fn default_reply(locale: Locale) -> &'static str {
    match locale {
        Locale::En => DEFAULT_EN,
        Locale::Bn => DEFAULT_BN,
    }
}
