//! Static page content.
//!
//! The site is a personal portfolio; all copy lives here as data so the
//! shell stays free of literals. Tables are lazily built once and cloned
//! into bundles by the page loaders.

use once_cell::sync::Lazy;

use super::{PageBundle, PageId};

/// Site owner, shown in the logo and the watermark.
pub const OWNER: &str = "Jesse Lee";
pub const SUBTITLE: &str = "Developer & Support";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub title: &'static str,
    pub date: &'static str,
    pub role: &'static str,
    pub link: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceRole {
    pub date: &'static str,
    pub title: &'static str,
    pub company: &'static str,
    pub award: Option<&'static str>,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLink {
    pub title: &'static str,
    pub href: &'static str,
}

/// Body of one loaded page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Home {
        bio_lines: Vec<&'static str>,
    },
    Projects(Vec<ProjectEntry>),
    Experience(Vec<ExperienceRole>),
    Contact {
        heading: &'static str,
        tagline: &'static str,
        links: Vec<ContactLink>,
    },
}

static BIO_LINES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Born in 2003",
        "in Hong Kong,",
        "I'm a front-end web",
        "developer & support",
        "specialist. My favor",
        "album is",
        "Because the internet",
        "and that's the reason",
        "why you are here.",
    ]
});

static PROJECTS: Lazy<Vec<ProjectEntry>> = Lazy::new(|| {
    vec![
        ProjectEntry {
            title: "HKJC Calligraphy Metaverse Website",
            date: "Aug. 2024",
            role: "Dev / Design: Carol Mak",
            link: Some("https://jc-ccultureatt.zuni.org.hk/en/calligraphy/opening-3/"),
        },
        ProjectEntry {
            title: "MEBOARD",
            date: "Oct. 2023",
            role: "Dev & Design",
            link: Some("https://social-app-drab.vercel.app/"),
        },
    ]
});

static EXPERIENCE: Lazy<Vec<ExperienceRole>> = Lazy::new(|| {
    vec![
        ExperienceRole {
            date: "Oct 2023 – Feb 2025",
            title: "System Administrator",
            company: "Texwinca Holdings Limited, Hong Kong",
            award: None,
            description: "Designed automated workflows reducing IT tickets by 30% and sales \
                team tasks by 25%. Managed SQL servers, developed BI reports, and provided \
                technical support for 100+ retail locations across Hong Kong, China, and \
                Singapore.",
        },
        ExperienceRole {
            date: "July 2024 – Aug 2024",
            title: "Front-End Developer",
            company: "Zuni Icosahedron, Hong Kong",
            award: Some("Website nominated for 2024 KAN TAI-KEUNG DESIGN AWARD"),
            description: "Collaborated with UI/UX designers to build 10+ multilingual \
                WordPress sites with interactive features, boosting engagement by 25%.",
        },
        ExperienceRole {
            date: "June 2021 – Sep 2023",
            title: "IT Support",
            company: "Hung Ling Restaurant, Hong Kong",
            award: None,
            description: "Provided comprehensive IT assistance and designed complete network \
                infrastructure including POS systems and printers to ensure smooth daily \
                operations.",
        },
    ]
});

static CONTACTS: Lazy<Vec<ContactLink>> = Lazy::new(|| {
    vec![
        ContactLink {
            title: "LinkedIn ↗",
            href: "https://www.linkedin.com/in/jesse-lee-619888284/",
        },
        ContactLink {
            title: "GitHub ↗",
            href: "https://github.com/leehin6969",
        },
        ContactLink {
            title: "Email ↗",
            href: "mailto:redmmo6969@gmail.com",
        },
        ContactLink {
            title: "Resume ↗",
            href: "https://leehin6969.github.io/JESSELEE_Resume.pdf",
        },
    ]
});

/// Build the bundle for one page from the static tables.
pub fn bundle(page: PageId) -> PageBundle {
    let body = match page {
        PageId::Home => PageBody::Home {
            bio_lines: BIO_LINES.clone(),
        },
        PageId::Projects => PageBody::Projects(PROJECTS.clone()),
        PageId::Experience => PageBody::Experience(EXPERIENCE.clone()),
        PageId::Contact => PageBody::Contact {
            heading: "Get In Touch",
            tagline: "Let's work together to create something amazing",
            links: CONTACTS.clone(),
        },
    };
    PageBundle { page, body }
}
