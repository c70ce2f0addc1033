//! Built-in content for Law & Energy Consultants.
//!
//! Strings use Markdown `**bold**` for emphasis; hosts decide how to render
//! it (see `subsystems::comms::typewriter::render_markdown`).
//!
//! ## Adding a locale
//!
//! 1. Add a variant to [`Locale`] and its arms in `code()` / `label()` / `parse()`
//! 2. Add a `const XX: LocaleContent` table below
//! 3. Add the field to [`ContentStore`] and the arm to `ContentStore::get()`
//! 4. Add a rule table in `rules.rs`

use super::{ContentStore, FormText, LocaleContent, Locale, OfficeInfo, Responses};

const ADDRESS: &str = "1913 Ave. Las Americas, San Antonio, Ponce, PR";
const EMAIL: &str = "vera@lawenergyconsultants.com";

const ES: LocaleContent = LocaleContent {
    locale: Locale::Es,
    title: "Law & Energy Consultants",
    subtitle: "Asistente Digital IA",
    welcome: "Pregunte sobre: **Medición Neta**, **Diseño Solar**, **Ubicación**, o **Representación Legal**.",
    placeholder: "¿En qué podemos ayudarle con su proyecto energético?",
    thinking: "Consultando base de datos...",
    office: OfficeInfo {
        location_label: "📍 Ubicación",
        address: ADDRESS,
        email_label: "📧 Correo",
        email: EMAIL,
        hours_label: "🕒 Horario",
        hours: "L-V 9am-6pm (Cita/Zoom)",
    },
    form: FormText {
        heading: "📝 Solicitar Cita",
        name_label: "Nombre Completo",
        email_label: "Correo Electrónico",
        phone_label: "Teléfono",
        description_label: "Breve descripción del caso",
        submit_label: "Enviar Solicitud",
        success: "✅ ¡Información enviada! Nos comunicaremos pronto.",
        missing_required: "⚠️ Por favor llene Nombre y Teléfono.",
    },
    responses: Responses {
        permits: "Nos especializamos en la permisología con **LUMA Energy** para certificaciones de medición neta. También asistimos con endosos de la **OGPe** y otros entes reguladores.",
        renewable: "Nuestro equipo ofrece diseño de ingeniería para **sistemas de energía renovable** (con baterías o conectados a la red). Manejamos el diseño técnico y legal para proyectos residenciales o comerciales.",
        electrical: "Proveemos servicios de diseño para **subestaciones eléctricas**, líneas de transmisión y distribución. ¿Necesita asistencia con algún voltaje específico?",
        legal: "Como firma especializada en **Derecho Energético**, representamos a clientes en foros administrativos y tribunales. También manejamos litigios civiles, contratos y leyes de propiedad.",
        contact: "Puede llenar el **formulario de cita** para coordinar una cita. Estamos ubicados en 1913 Ave. Las Americas, Ponce, PR.",
        fallback: "Entiendo su consulta. Como asistente de IA, ofrezco información general sobre nuestros servicios. Para asesoría legal específica, por favor contacte nuestra oficina.",
    },
};

const EN: LocaleContent = LocaleContent {
    locale: Locale::En,
    title: "Law & Energy Consultants",
    subtitle: "AI Digital Assistant",
    welcome: "Ask about: **Net Metering**, **Solar Design**, **Location**, or **Legal Representation**.",
    placeholder: "How can we help with your energy project?",
    thinking: "Consulting firm database...",
    office: OfficeInfo {
        location_label: "📍 Location",
        address: ADDRESS,
        email_label: "📧 Email",
        email: EMAIL,
        hours_label: "🕒 Hours",
        hours: "M-F 9am-6pm (Appt/Zoom)",
    },
    form: FormText {
        heading: "📝 Request Appointment",
        name_label: "Full Name",
        email_label: "Email Address",
        phone_label: "Phone Number",
        description_label: "Case Description",
        submit_label: "Send Request",
        success: "✅ Sent! We will contact you shortly.",
        missing_required: "⚠️ Please fill in Name and Phone.",
    },
    responses: Responses {
        permits: "We specialize in permitting with **LUMA Energy** to obtain net metering certifications. We can also assist with endorsements from the OGPe and other regulatory bodies.",
        renewable: "Our team offers engineering design for **renewable energy systems** (both battery-backed and grid-tied). We can handle the full technical and legal design for residential or commercial projects.",
        electrical: "We provide design services for **electrical substations**, transmission lines, and distribution lines. Do you need assistance with a specific voltage level?",
        legal: "As a firm specializing in **Energy Law**, we represent clients in administrative forums and courts. We also handle civil litigation, contracts, and property law.",
        contact: "You can fill out the **appointment form** to request an appointment. We are located at 1913 Ave. Las Americas, Ponce, PR.",
        fallback: "I understand your inquiry. As an AI assistant, I provide general info on Engineering & Law. For specific legal advice, please contact our office directly.",
    },
};

pub(super) static CONTENT: ContentStore = ContentStore { es: ES, en: EN };
