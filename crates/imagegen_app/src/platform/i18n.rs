//! English and Arabic wording for everything the shell prints.

use imagegen_core::{GenerationFailure, GenerationStatus, Notification};
use imagegen_engine::AuthError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "ar" | "arabic" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

/// Fixed labels used by the renderer and command help.
pub struct Labels {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub prompt: &'static str,
    pub source_image: &'static str,
    pub result: &'static str,
    pub error: &'static str,
    pub history: &'static str,
    pub history_empty: &'static str,
    pub history_loading: &'static str,
    pub signed_in_as: &'static str,
    pub anonymous: &'static str,
    pub downloading: &'static str,
    pub signed_in: &'static str,
    pub signed_up: &'static str,
    pub signed_out: &'static str,
    pub language_changed: &'static str,
    pub unknown_command: &'static str,
    pub no_such_entry: &'static str,
    pub read_failed: &'static str,
    pub help: &'static str,
}

const EN: Labels = Labels {
    title: "Abbas AI Image Generator",
    subtitle: "Turn your ideas into images with AI",
    prompt: "Prompt",
    source_image: "Source image",
    result: "Generated image",
    error: "Error",
    history: "History",
    history_empty: "No images yet. Start generating!",
    history_loading: "Loading history...",
    signed_in_as: "Signed in as",
    anonymous: "Not signed in",
    downloading: "Downloading...",
    signed_in: "Logged in successfully!",
    signed_up: "Account created successfully!",
    signed_out: "Logged out.",
    language_changed: "Language set to English.",
    unknown_command: "Unknown command. Type /help for the list of commands.",
    no_such_entry: "No history entry matches that selection.",
    read_failed: "Could not read the file",
    help: "Type a description and press Enter to generate.\n\
           /attach <file>      use an image as the source\n\
           /detach             remove the source image\n\
           /history            reload the history\n\
           /select <n|id>      show a history image\n\
           /delete <n|id>      delete a history image\n\
           /download [n|id]    save the current or a history image\n\
           /login <email> <password>\n\
           /signup <email> <password>\n\
           /logout\n\
           /lang <en|ar>\n\
           /quit",
};

const AR: Labels = Labels {
    title: "مولد الصور بالذكاء الاصطناعي - عباس",
    subtitle: "حوّل أفكارك إلى صور باستخدام الذكاء الاصطناعي",
    prompt: "الوصف",
    source_image: "الصورة المصدر",
    result: "الصورة المُنشأة",
    error: "خطأ",
    history: "السجل",
    history_empty: "لا توجد صور بعد. ابدأ بالإنشاء!",
    history_loading: "جاري تحميل السجل...",
    signed_in_as: "مسجل الدخول باسم",
    anonymous: "غير مسجل الدخول",
    downloading: "جاري التحميل...",
    signed_in: "تم تسجيل الدخول بنجاح!",
    signed_up: "تم إنشاء الحساب بنجاح!",
    signed_out: "تم تسجيل الخروج.",
    language_changed: "تم تغيير اللغة إلى العربية.",
    unknown_command: "أمر غير معروف. اكتب /help لعرض الأوامر.",
    no_such_entry: "لا يوجد عنصر في السجل يطابق هذا الاختيار.",
    read_failed: "تعذرت قراءة الملف",
    help: "اكتب وصفاً واضغط Enter للإنشاء.\n\
           /attach <ملف>       استخدام صورة كمصدر\n\
           /detach             إزالة الصورة المصدر\n\
           /history            إعادة تحميل السجل\n\
           /select <رقم|معرف>  عرض صورة من السجل\n\
           /delete <رقم|معرف>  حذف صورة من السجل\n\
           /download [رقم|معرف] حفظ الصورة الحالية أو صورة من السجل\n\
           /login <البريد> <كلمة المرور>\n\
           /signup <البريد> <كلمة المرور>\n\
           /logout\n\
           /lang <en|ar>\n\
           /quit",
};

pub fn labels(lang: Language) -> &'static Labels {
    match lang {
        Language::En => &EN,
        Language::Ar => &AR,
    }
}

pub fn status_text(lang: Language, status: GenerationStatus) -> &'static str {
    match (lang, status) {
        (Language::En, GenerationStatus::Idle) => "Ready",
        (Language::En, GenerationStatus::InFlight) => "Creating your masterpiece...",
        (Language::En, GenerationStatus::Succeeded) => "Done",
        (Language::En, GenerationStatus::Failed) => "Failed",
        (Language::Ar, GenerationStatus::Idle) => "جاهز",
        (Language::Ar, GenerationStatus::InFlight) => "جاري إنشاء تحفتك الفنية...",
        (Language::Ar, GenerationStatus::Succeeded) => "تم",
        (Language::Ar, GenerationStatus::Failed) => "فشل",
    }
}

fn failure_text(lang: Language, failure: &GenerationFailure) -> String {
    match (lang, failure) {
        (Language::En, GenerationFailure::RequestRejected(detail)) => {
            format!("Failed to generate image: {detail}")
        }
        (Language::En, GenerationFailure::Transport(detail)) => {
            format!("An unexpected error occurred: {detail}")
        }
        (Language::En, GenerationFailure::NoImageReturned) => {
            "Failed to generate image: no image was returned".to_string()
        }
        (Language::Ar, GenerationFailure::RequestRejected(detail)) => {
            format!("فشل في إنشاء الصورة: {detail}")
        }
        (Language::Ar, GenerationFailure::Transport(detail)) => {
            format!("حدث خطأ غير متوقع: {detail}")
        }
        (Language::Ar, GenerationFailure::NoImageReturned) => {
            "فشل في إنشاء الصورة: لم يتم إرجاع أي صورة".to_string()
        }
    }
}

pub fn notification_text(lang: Language, note: &Notification) -> String {
    match lang {
        Language::En => match note {
            Notification::EmptyPrompt => "Please enter a description for the image".to_string(),
            Notification::InvalidFileType { content_type } => {
                format!("Please select an image file (got {content_type})")
            }
            Notification::AttachmentTooLarge { max_bytes } => {
                format!("Image is too large (limit {} KiB)", max_bytes / 1024)
            }
            Notification::Generated => "Image generated successfully!".to_string(),
            Notification::GenerationFailed(failure) => failure_text(lang, failure),
            Notification::Saved => "Saved to history".to_string(),
            Notification::SaveFailed { reason } => {
                format!("Failed to save image to history: {reason}")
            }
            Notification::HistoryLoadFailed { reason } => {
                format!("Failed to load history: {reason}")
            }
            Notification::Deleted => "Image deleted successfully".to_string(),
            Notification::DeleteFailed { reason } => format!("Failed to delete image: {reason}"),
            Notification::Downloaded { location } => format!("Image saved to {location}"),
            Notification::DownloadFailed { reason } => {
                format!("Failed to download image: {reason}")
            }
        },
        Language::Ar => match note {
            Notification::EmptyPrompt => "الرجاء إدخال وصف للصورة".to_string(),
            Notification::InvalidFileType { content_type } => {
                format!("الرجاء اختيار ملف صورة ({content_type})")
            }
            Notification::AttachmentTooLarge { max_bytes } => {
                format!("الصورة كبيرة جداً (الحد {} كيلوبايت)", max_bytes / 1024)
            }
            Notification::Generated => "تم إنشاء الصورة بنجاح!".to_string(),
            Notification::GenerationFailed(failure) => failure_text(lang, failure),
            Notification::Saved => "تم الحفظ في السجل".to_string(),
            Notification::SaveFailed { reason } => {
                format!("فشل في حفظ الصورة في السجل: {reason}")
            }
            Notification::HistoryLoadFailed { reason } => {
                format!("فشل في تحميل السجل: {reason}")
            }
            Notification::Deleted => "تم حذف الصورة بنجاح".to_string(),
            Notification::DeleteFailed { reason } => format!("فشل في حذف الصورة: {reason}"),
            Notification::Downloaded { location } => format!("تم حفظ الصورة في {location}"),
            Notification::DownloadFailed { reason } => format!("فشل في تحميل الصورة: {reason}"),
        },
    }
}

pub fn auth_error_text(lang: Language, err: &AuthError) -> String {
    match (lang, err) {
        (Language::Ar, AuthError::InvalidEmail) => "البريد الإلكتروني غير صالح".to_string(),
        (Language::Ar, AuthError::PasswordTooShort) => {
            "كلمة المرور يجب أن تكون 6 أحرف على الأقل".to_string()
        }
        (Language::Ar, AuthError::InvalidCredentials) => {
            "البريد الإلكتروني أو كلمة المرور غير صحيحة".to_string()
        }
        (Language::Ar, AuthError::AlreadyRegistered) => {
            "هذا البريد الإلكتروني مسجل بالفعل".to_string()
        }
        (Language::Ar, AuthError::ConfirmationRequired) => {
            "تم إنشاء الحساب. يرجى تأكيد بريدك الإلكتروني ثم تسجيل الدخول".to_string()
        }
        (Language::Ar, other) => format!("حدث خطأ غير متوقع: {other}"),
        (Language::En, other) => {
            let text = other.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => text,
            }
        }
    }
}
